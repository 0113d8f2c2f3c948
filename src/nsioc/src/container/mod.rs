pub mod namespace;

mod core;
mod handle;

use snafu::prelude::*;

use crate::autowire::AutowireError;
use crate::config::ConfigError;
use crate::lifecycle::LifecycleError;

pub use handle::Container;

pub const CONFIG_NAMESPACE: &str = "config";
pub const CONTROLLER_NAMESPACE: &str = "controllers";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const API_NAMESPACE: &str = "api";

pub const CONFIG_PRIORITY: i32 = 99;
pub const CONTROLLER_PRIORITY: i32 = 69;
pub const DEFAULT_PRIORITY: i32 = 9;
pub const API_PRIORITY: i32 = -99;

/// Priority of namespaces created on first use.
pub const USER_PRIORITY: i32 = 0;

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LookupError {
    #[snafu(display("object {namespace}/{object} is not registered"))]
    #[non_exhaustive]
    NotFound { namespace: String, object: String },
    #[snafu(display("object {namespace}/{object} is not a `{expected}`"))]
    #[non_exhaustive]
    TypeMismatch {
        namespace: String,
        object: String,
        expected: &'static str,
    },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ContainerError {
    #[snafu(display("could not load configuration"))]
    #[non_exhaustive]
    Config { source: ConfigError },
    #[snafu(display("could not start namespace {namespace}"))]
    #[non_exhaustive]
    Lifecycle {
        namespace: String,
        source: LifecycleError,
    },
    #[snafu(display("could not autowire dependencies"))]
    #[non_exhaustive]
    Autowire { source: AutowireError },
}
