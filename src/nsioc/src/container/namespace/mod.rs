mod options;
mod wrapper;

use std::any;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicI32, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::RwLock;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::autowire::{autowire_object, AutowireError, Resolver};
use crate::container::LookupError;
use crate::graph::{DependencyInfo, ObjectDependencies};
use crate::lifecycle::{self, LifecycleError, LifecycleState, ShutdownContext};
use crate::object::Object;
use crate::version::compare_version;

pub use options::GetOptions;
pub use wrapper::ObjectWrapper;

type Snapshot = Arc<Vec<Arc<ObjectWrapper>>>;

/// A named, thread-safe collection of objects.
///
/// Reads work on immutable snapshots: a reader clones the current snapshot
/// under a momentary read lock and releases the lock before any user code
/// runs. Writers copy the snapshot, modify the copy and swap it in. As a
/// result [`NamespaceStore::get`] may be called from any lifecycle hook or
/// [`NamespaceStore::for_each`] callback, including ones running on objects
/// of this very namespace.
///
/// Registering into a namespace from inside one of its own `for_each`
/// callbacks doesn't deadlock either, but the running iteration won't see
/// the new object. Doing so is unsupported.
pub struct NamespaceStore {
    namespace: String,
    priority: AtomicI32,
    items: RwLock<Snapshot>,
}

impl NamespaceStore {
    pub fn new(namespace: impl Into<String>, priority: i32) -> Self {
        Self {
            namespace: namespace.into(),
            priority: AtomicI32::new(priority),
            items: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn priority(&self) -> i32 {
        self.priority.load(AtomicOrdering::Acquire)
    }

    /// Changes the namespace priority. The container only picks up the new
    /// value the next time it reorders its namespaces.
    pub fn set_priority(&self, priority: i32) {
        self.priority.store(priority, AtomicOrdering::Release);
    }

    /// Registers `object` under its [`Object::name`].
    ///
    /// # Errors
    ///
    /// See [`NamespaceStore::registry_shared`].
    pub fn registry<T: Object>(&self, object: T) -> Result<(), RegistryError> {
        self.registry_shared(Arc::new(object))
    }

    /// Registers a shared object under its [`Object::name`].
    ///
    /// If the name is taken, the new object replaces the old one only if at
    /// least one of them allows overwriting and the new version is strictly
    /// greater. A replacement keeps the position of the old object.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if neither object allows
    /// overwriting, [`RegistryError::DuplicateVersion`] if the versions are
    /// equal and [`RegistryError::VersionDowngrade`] if the new version is
    /// lower.
    pub fn registry_shared(&self, object: Arc<dyn Object>) -> Result<(), RegistryError> {
        // Reads every user-provided attribute before taking the lock.
        let wrapper = Arc::new(ObjectWrapper::new(object));

        let mut items = self.items.write();
        let Some(index) = items.iter().position(|w| w.name() == wrapper.name()) else {
            debug!(
                namespace = %self.namespace,
                object = wrapper.name(),
                version = wrapper.version(),
                priority = wrapper.priority(),
                "registered object"
            );
            Arc::make_mut(&mut *items).push(wrapper);
            return Ok(());
        };

        let current = &items[index];
        ensure!(
            current.allow_overwrite() || wrapper.allow_overwrite(),
            AlreadyRegisteredSnafu {
                namespace: &self.namespace,
                object: wrapper.name(),
            }
        );

        match compare_version(wrapper.version(), current.version()) {
            Ordering::Greater => {
                info!(
                    namespace = %self.namespace,
                    object = wrapper.name(),
                    from = current.version(),
                    to = wrapper.version(),
                    "replaced object with a newer version"
                );
                Arc::make_mut(&mut *items)[index] = wrapper;
                Ok(())
            }
            Ordering::Equal => DuplicateVersionSnafu {
                namespace: &self.namespace,
                object: wrapper.name(),
                version: wrapper.version(),
            }
            .fail(),
            Ordering::Less => VersionDowngradeSnafu {
                namespace: &self.namespace,
                object: wrapper.name(),
                current: current.version(),
                attempted: wrapper.version(),
            }
            .fail(),
        }
    }

    /// Like [`NamespaceStore::registry`] but panics on conflicts, which are
    /// wiring bugs.
    ///
    /// # Panics
    ///
    /// Panics if the registration fails.
    pub fn must_registry<T: Object>(&self, object: T) {
        if let Err(err) = self.registry(object) {
            panic!("{err}");
        }
    }

    /// Returns the object registered as `name`, or `None` if there is none
    /// or it doesn't match the requested version.
    pub fn get(&self, name: &str, options: &GetOptions) -> Option<Arc<dyn Object>> {
        self.get_wrapper(name, options)
            .map(|wrapper| Arc::clone(wrapper.value()))
    }

    /// Returns the wrapper registered as `name`, honoring the same options as
    /// [`NamespaceStore::get`].
    pub fn get_wrapper(&self, name: &str, options: &GetOptions) -> Option<Arc<ObjectWrapper>> {
        let snapshot = self.snapshot();
        let wrapper = snapshot.iter().find(|w| w.name() == name)?;
        match options.requested_version() {
            Some(version) if compare_version(version, wrapper.version()).is_ne() => None,
            _ => Some(Arc::clone(wrapper)),
        }
    }

    /// Returns the object registered as `name` viewed as `Arc<T>`. `None`
    /// covers both a missing object and one of another type.
    pub fn get_as<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: ?Sized + 'static,
    {
        self.get_wrapper(name, &GetOptions::new())
            .and_then(|wrapper| wrapper.value_as::<T>())
    }

    /// Returns the object registered as `name` viewed as `Arc<T>`.
    ///
    /// # Errors
    ///
    /// Distinguishes a missing object from one of another type.
    pub fn require<T>(&self, name: &str) -> Result<Arc<T>, LookupError>
    where
        T: ?Sized + 'static,
    {
        let wrapper = self
            .get_wrapper(name, &GetOptions::new())
            .ok_or_else(|| LookupError::NotFound {
                namespace: self.namespace.clone(),
                object: name.to_owned(),
            })?;
        wrapper
            .value_as::<T>()
            .ok_or_else(|| LookupError::TypeMismatch {
                namespace: self.namespace.clone(),
                object: name.to_owned(),
                expected: any::type_name::<T>(),
            })
    }

    /// Calls `f` on every wrapper of the current snapshot, in the current
    /// order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&ObjectWrapper),
    {
        let snapshot = self.snapshot();
        for wrapper in snapshot.iter() {
            let wrapper: &ObjectWrapper = wrapper;
            f(wrapper);
        }
    }

    /// Returns the names of all objects in the current order.
    pub fn names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|wrapper| wrapper.name().to_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn state(&self, name: &str) -> Option<LifecycleState> {
        self.get_wrapper(name, &GetOptions::new())
            .map(|wrapper| wrapper.state())
    }

    /// Sorts objects by their cached priority, highest first. Objects with
    /// equal priorities keep their registration order.
    pub fn sort(&self) {
        let mut items = self.items.write();
        Arc::make_mut(&mut *items).sort_by_key(|wrapper| std::cmp::Reverse(wrapper.priority()));
    }

    /// Sorts the namespace and runs the startup hooks of every object.
    ///
    /// # Errors
    ///
    /// Stops at the first object whose fatal startup hook fails.
    pub fn init(&self) -> Result<(), LifecycleError> {
        self.sort();
        let snapshot = self.snapshot();
        for wrapper in snapshot.iter() {
            lifecycle::start(&self.namespace, wrapper)?;
        }
        debug!(namespace = %self.namespace, objects = snapshot.len(), "namespace initialized");
        Ok(())
    }

    /// Sorts the namespace and runs the shutdown hooks of every object, in
    /// the same order as [`NamespaceStore::init`].
    pub fn close(&self, ctx: &ShutdownContext) {
        self.sort();
        let snapshot = self.snapshot();
        for wrapper in snapshot.iter() {
            lifecycle::stop(&self.namespace, wrapper, ctx);
        }
        debug!(namespace = %self.namespace, objects = snapshot.len(), "namespace closed");
    }

    /// Injects the autowired fields of every object in the namespace.
    ///
    /// # Errors
    ///
    /// Returns every field that couldn't be wired, aggregated.
    pub fn autowire(&self, resolver: &dyn Resolver) -> Result<(), AutowireError> {
        let mut errors = Vec::new();
        let mut wired = 0;
        for wrapper in self.snapshot().iter() {
            wired += autowire_object(&self.namespace, wrapper.value().as_ref(), resolver, &mut errors);
        }
        debug!(namespace = %self.namespace, fields = wired, "namespace autowired");
        AutowireError::aggregate(errors)
    }

    /// Collects the dependency edges declared by every object, either through
    /// `#[ioc(...)]` fields or [`Object::declare_dependencies`].
    pub fn dependencies(&self) -> Vec<ObjectDependencies> {
        self.snapshot()
            .iter()
            .map(|wrapper| {
                let object = wrapper.value();
                let mut edges: Vec<DependencyInfo> = DependencyInfo::from_inject_points(
                    &self.namespace,
                    &object.inject_points(),
                );
                edges.extend(object.declare_dependencies());
                ObjectDependencies::new(&self.namespace, wrapper.name(), edges)
            })
            .collect()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.items.read())
    }
}

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("object {namespace}/{object} is already registered and can't be overwritten"))]
    #[non_exhaustive]
    AlreadyRegistered { namespace: String, object: String },
    #[snafu(display("object {namespace}/{object} is already registered with version {version}"))]
    #[non_exhaustive]
    DuplicateVersion {
        namespace: String,
        object: String,
        version: String,
    },
    #[snafu(display(
        "object {namespace}/{object} can't be downgraded from version {current} to {attempted}"
    ))]
    #[non_exhaustive]
    VersionDowngrade {
        namespace: String,
        object: String,
        current: String,
        attempted: String,
    },
}
