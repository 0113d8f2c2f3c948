use std::any::{self, Any, TypeId};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use parking_lot::RwLock;

/// A type-erased field that can receive an injected dependency.
pub trait InjectSlot {
    /// The [`TypeId`] of the value the slot holds, which is `T` for an
    /// `Autowired<T>`.
    fn target_type(&self) -> TypeId;

    fn target_type_name(&self) -> &'static str;

    /// Stores `value` into the slot. `value` is expected to be a boxed
    /// `Arc<T>`; anything else is handed back untouched.
    ///
    /// # Errors
    ///
    /// Returns `value` if its type doesn't match the slot.
    fn assign(&self, value: Box<dyn Any + Send + Sync>) -> Result<(), Box<dyn Any + Send + Sync>>;

    fn is_wired(&self) -> bool;
}

/// A field filled in by the autowire pass.
///
/// `T` may be a concrete object type or a trait object such as
/// `dyn UserService`. The slot is empty until the container autowires the
/// owning object.
pub struct Autowired<T: ?Sized> {
    inner: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> Autowired<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Returns the injected dependency, if any.
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.read().clone()
    }

    pub fn set(&self, value: Arc<T>) {
        *self.inner.write() = Some(value);
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Debug for Autowired<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Autowired")
            .field("target", &any::type_name::<T>())
            .field("wired", &self.is_set())
            .finish()
    }
}

impl<T> InjectSlot for Autowired<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn target_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn target_type_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn assign(&self, value: Box<dyn Any + Send + Sync>) -> Result<(), Box<dyn Any + Send + Sync>> {
        let value = value.downcast::<Arc<T>>()?;
        self.set(*value);
        Ok(())
    }

    fn is_wired(&self) -> bool {
        self.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn autowired_assign_succeeds_for_trait_objects() {
        let slot: Autowired<dyn Greeter> = Autowired::new();
        assert!(!slot.is_wired());
        assert_eq!(slot.target_type(), TypeId::of::<dyn Greeter>());

        let value: Arc<dyn Greeter> = Arc::new(English);
        slot.assign(Box::new(value)).unwrap();

        assert!(slot.is_wired());
        assert_eq!(slot.get().unwrap().greet(), "hello");
    }

    #[test]
    fn autowired_assign_fails_when_type_mismatches() {
        let slot: Autowired<String> = Autowired::new();
        let res = slot.assign(Box::new(Arc::new(42i32)));
        assert!(res.is_err());
        assert!(!slot.is_wired());
    }
}
