//! Startup and shutdown sequencing of a single object.
//!
//! Startup runs `on_post_config`, `on_pre_init`, `init` and `on_post_init`.
//! The first three are fatal; a failing `on_post_init` is only logged.
//! Shutdown runs `on_pre_stop`, `close` and `on_post_stop`. Nothing there is
//! fatal and `close` always runs.

mod context;

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::thread;

use oneshot::RecvTimeoutError;
use snafu::prelude::*;
use tracing::{debug, error, warn};

use crate::container::namespace::ObjectWrapper;
use crate::object::{BoxError, Object};

pub use context::ShutdownContext;

/// Where an object is in its lifecycle. States advance strictly in
/// declaration order; `Failed` marks an object whose fatal startup hook
/// returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Registered,
    Configured,
    PreInit,
    Initialized,
    PostInit,
    Running,
    PreStop,
    Closed,
    PostStop,
    Failed,
}

impl LifecycleState {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Configured => "configured",
            Self::PreInit => "pre-init",
            Self::Initialized => "initialized",
            Self::PostInit => "post-init",
            Self::Running => "running",
            Self::PreStop => "pre-stop",
            Self::Closed => "closed",
            Self::PostStop => "post-stop",
            Self::Failed => "failed",
        }
    }
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum LifecycleError {
    #[snafu(display("post-config hook of {namespace}/{object} failed"))]
    #[non_exhaustive]
    PostConfig {
        namespace: String,
        object: String,
        source: BoxError,
    },
    #[snafu(display("pre-init hook of {namespace}/{object} failed"))]
    #[non_exhaustive]
    PreInit {
        namespace: String,
        object: String,
        source: BoxError,
    },
    #[snafu(display("could not initialize {namespace}/{object}"))]
    #[non_exhaustive]
    Init {
        namespace: String,
        object: String,
        source: BoxError,
    },
}

/// Runs the startup hooks of one object.
///
/// # Errors
///
/// Returns an error if `on_post_config`, `on_pre_init` or `init` fails, in
/// which case the object is left in [`LifecycleState::Failed`].
pub fn start(namespace: &str, wrapper: &ObjectWrapper) -> Result<(), LifecycleError> {
    let object = wrapper.value();
    let name = wrapper.name();
    debug!(namespace, object = name, priority = wrapper.priority(), "starting object");

    let res = object
        .on_post_config()
        .context(PostConfigSnafu {
            namespace,
            object: name,
        })
        .inspect(|_| wrapper.set_state(LifecycleState::Configured))
        .and_then(|_| {
            object.on_pre_init().context(PreInitSnafu {
                namespace,
                object: name,
            })
        })
        .inspect(|_| wrapper.set_state(LifecycleState::PreInit))
        .and_then(|_| {
            object.init().context(InitSnafu {
                namespace,
                object: name,
            })
        });

    if let Err(err) = res {
        wrapper.set_state(LifecycleState::Failed);
        error!(namespace, object = name, error = %err, "object failed to start");
        return Err(err);
    }
    wrapper.set_state(LifecycleState::Initialized);

    if let Err(err) = object.on_post_init() {
        warn!(namespace, object = name, error = %err, "post-init hook failed");
    }
    wrapper.set_state(LifecycleState::PostInit);
    wrapper.set_state(LifecycleState::Running);
    Ok(())
}

/// Runs the shutdown hooks of one object. Failures are logged and never
/// prevent [`Object::close`] from running.
pub fn stop(namespace: &str, wrapper: &ObjectWrapper, ctx: &ShutdownContext) {
    let object = wrapper.value();
    let name = wrapper.name();
    debug!(namespace, object = name, priority = wrapper.priority(), "stopping object");

    if ctx.is_expired() {
        warn!(namespace, object = name, "deadline already passed, skipping pre-stop hook");
    } else if let Err(err) = run_pre_stop(object, ctx) {
        warn!(namespace, object = name, error = %err, "pre-stop hook did not complete");
    }
    wrapper.set_state(LifecycleState::PreStop);

    object.close(ctx);
    wrapper.set_state(LifecycleState::Closed);

    if let Err(err) = object.on_post_stop(ctx) {
        warn!(namespace, object = name, error = %err, "post-stop hook failed");
    }
    wrapper.set_state(LifecycleState::PostStop);
}

/// Runs `on_pre_stop`, waiting no longer than the context's deadline.
///
/// With a deadline the hook runs on a helper thread. If the deadline passes
/// first, the helper is left to finish on its own.
fn run_pre_stop(object: &Arc<dyn Object>, ctx: &ShutdownContext) -> Result<(), BoxError> {
    let Some(remaining) = ctx.remaining() else {
        return object.on_pre_stop(ctx);
    };

    let (sender, receiver) = oneshot::channel();
    let helper = Arc::clone(object);
    let helper_ctx = *ctx;
    let spawned = thread::Builder::new()
        .name(format!("pre-stop-{}", object.name()))
        .spawn(move || {
            let _ = sender.send(helper.on_pre_stop(&helper_ctx));
        });

    if let Err(err) = spawned {
        warn!(error = %err, "could not spawn pre-stop helper, running inline");
        return object.on_pre_stop(ctx);
    }

    match receiver.recv_timeout(remaining) {
        Ok(res) => res,
        Err(RecvTimeoutError::Timeout) => Err(PreStopTimeout.into()),
        Err(RecvTimeoutError::Disconnected) => Err("pre-stop hook panicked".into()),
    }
}

#[derive(Debug)]
struct PreStopTimeout;

impl Display for PreStopTimeout {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "pre-stop hook exceeded the shutdown deadline")
    }
}

impl std::error::Error for PreStopTimeout {}
