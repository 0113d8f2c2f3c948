use std::error::Error;

use crate::autowire::Autowire;
use crate::config::{ConfigError, ConfigSource};
use crate::graph::DependencyInfo;
use crate::lifecycle::ShutdownContext;
use crate::version::DEFAULT_VERSION;

/// The error type returned by user-defined lifecycle hooks.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A long-lived component managed by a [`Container`].
///
/// Only [`Object::name`] is required. Every hook defaults to a no-op, so an
/// implementation overrides exactly the stages it cares about. Objects are
/// shared behind an `Arc`, hence all hooks take `&self` and state that
/// changes during the lifecycle lives behind interior mutability.
///
/// [`Object::name`], [`Object::version`], [`Object::priority`] and
/// [`Object::allow_overwrite`] are read once at registration time and
/// cached. They must not call back into the container.
///
/// The [`Autowire`] supertrait is usually derived with
/// `#[derive(Autowire)]`, which also works for structs without any
/// injected field.
///
/// [`Container`]: crate::container::Container
pub trait Object: Autowire + Send + Sync + 'static {
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        DEFAULT_VERSION
    }

    /// Objects with a higher priority are initialized and closed first.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether a later registration under the same name may replace this
    /// object, or this object may replace an earlier one.
    fn allow_overwrite(&self) -> bool {
        false
    }

    /// Applies configuration overlays. Called by the config loader for
    /// objects in the `config` namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration can't be extracted.
    fn load_config(&self, source: &ConfigSource<'_>) -> Result<(), ConfigError> {
        let _ = source;
        Ok(())
    }

    /// Describes dependencies the object fetches imperatively. Only used for
    /// diagnostics; nothing is injected from these edges.
    fn declare_dependencies(&self) -> Vec<DependencyInfo> {
        Vec::new()
    }

    fn on_post_config(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn on_pre_init(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn init(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn on_post_init(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn on_pre_stop(&self, ctx: &ShutdownContext) -> Result<(), BoxError> {
        let _ = ctx;
        Ok(())
    }

    /// Releases resources. Always called during shutdown and may be called
    /// again after a forced reload, so it must be idempotent.
    fn close(&self, ctx: &ShutdownContext) {
        let _ = ctx;
    }

    fn on_post_stop(&self, ctx: &ShutdownContext) -> Result<(), BoxError> {
        let _ = ctx;
        Ok(())
    }
}
