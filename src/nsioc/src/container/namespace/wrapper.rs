use std::any::TypeId;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::lifecycle::LifecycleState;
use crate::object::Object;

/// A registered object together with the metadata captured at registration.
///
/// The name, version, priority and overwrite policy are read from the
/// object exactly once, so sorting and overwrite arbitration never call
/// back into user code.
pub struct ObjectWrapper {
    name: String,
    version: String,
    priority: i32,
    allow_overwrite: bool,
    value: Arc<dyn Object>,
    state: Mutex<LifecycleState>,
}

impl ObjectWrapper {
    pub fn new(value: Arc<dyn Object>) -> Self {
        Self {
            name: value.name().to_owned(),
            version: value.version().to_owned(),
            priority: value.priority(),
            allow_overwrite: value.allow_overwrite(),
            value,
            state: Mutex::new(LifecycleState::Registered),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn allow_overwrite(&self) -> bool {
        self.allow_overwrite
    }

    pub fn value(&self) -> &Arc<dyn Object> {
        &self.value
    }

    /// Views the object as `Arc<T>`, where `T` is its concrete type or one of
    /// the trait objects it declares with `#[ioc(provides(...))]`.
    pub fn value_as<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + 'static,
    {
        Arc::clone(&self.value)
            .upcast(TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<Arc<T>>().ok())
            .map(|object| *object)
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub(crate) fn set_state(&self, state: LifecycleState) {
        *self.state.lock() = state;
    }
}

impl Debug for ObjectWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ObjectWrapper")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("priority", &self.priority)
            .field("allow_overwrite", &self.allow_overwrite)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

