use std::sync::Arc;

use crate::autowire::AutowireError;
use crate::config::{ConfigError, LoadConfigRequest, LoadRequest};
use crate::container::core::ContainerCore;
use crate::container::namespace::{GetOptions, NamespaceStore, RegistryError};
use crate::container::{
    ContainerError, LookupError, API_NAMESPACE, CONFIG_NAMESPACE, CONTROLLER_NAMESPACE,
    DEFAULT_NAMESPACE,
};
use crate::graph::DependencyGraph;
use crate::lifecycle::ShutdownContext;
use crate::object::Object;

/// A set of namespaces with a shared startup and shutdown sequence.
///
/// `Container` is a cheap handle; clones refer to the same namespaces. A new
/// container comes with the built-in namespaces `config`, `controllers`,
/// `default` and `api`, started in that order.
#[derive(Clone)]
pub struct Container {
    core: Arc<ContainerCore>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            core: Arc::new(ContainerCore::new()),
        }
    }

    /// Returns the namespace called `name`, creating it on first use with
    /// priority [`USER_PRIORITY`].
    ///
    /// [`USER_PRIORITY`]: crate::container::USER_PRIORITY
    pub fn namespace(&self, name: &str) -> Arc<NamespaceStore> {
        self.core.namespace(name)
    }

    /// Creates a namespace with an explicit priority or changes the priority
    /// of an existing one.
    pub fn register_namespace(&self, name: &str, priority: i32) -> Arc<NamespaceStore> {
        self.core.register_namespace(name, priority)
    }

    /// Returns every namespace in startup order.
    pub fn namespaces(&self) -> Vec<Arc<NamespaceStore>> {
        self.core.namespaces()
    }

    pub fn config(&self) -> Arc<NamespaceStore> {
        self.namespace(CONFIG_NAMESPACE)
    }

    pub fn controllers(&self) -> Arc<NamespaceStore> {
        self.namespace(CONTROLLER_NAMESPACE)
    }

    pub fn default_namespace(&self) -> Arc<NamespaceStore> {
        self.namespace(DEFAULT_NAMESPACE)
    }

    pub fn api(&self) -> Arc<NamespaceStore> {
        self.namespace(API_NAMESPACE)
    }

    /// Registers `object` into `namespace`, creating the namespace if needed.
    ///
    /// # Errors
    ///
    /// See [`NamespaceStore::registry_shared`].
    pub fn registry<T: Object>(&self, namespace: &str, object: T) -> Result<(), RegistryError> {
        self.namespace(namespace).registry(object)
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<Arc<dyn Object>> {
        self.core.get(namespace, name, &GetOptions::new())
    }

    pub fn get_with(
        &self,
        namespace: &str,
        name: &str,
        options: &GetOptions,
    ) -> Option<Arc<dyn Object>> {
        self.core.get(namespace, name, options)
    }

    pub fn get_as<T>(&self, namespace: &str, name: &str) -> Option<Arc<T>>
    where
        T: ?Sized + 'static,
    {
        self.core.find_namespace(namespace)?.get_as(name)
    }

    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] if the namespace or the object
    /// doesn't exist and [`LookupError::TypeMismatch`] if the object can't be
    /// viewed as `T`.
    pub fn require<T>(&self, namespace: &str, name: &str) -> Result<Arc<T>, LookupError>
    where
        T: ?Sized + 'static,
    {
        match self.core.find_namespace(namespace) {
            Some(store) => store.require(name),
            None => Err(LookupError::NotFound {
                namespace: namespace.to_owned(),
                object: name.to_owned(),
            }),
        }
    }

    /// Injects the autowired fields of every object in every namespace.
    ///
    /// # Errors
    ///
    /// Returns every field that couldn't be wired, across all namespaces.
    pub fn autowire(&self) -> Result<(), AutowireError> {
        self.core.autowire()
    }

    /// Runs the startup hooks of every namespace, highest priority first.
    ///
    /// # Errors
    ///
    /// Stops at the first object whose fatal startup hook fails.
    pub fn init(&self) -> Result<(), ContainerError> {
        self.core.init()
    }

    /// Loads configuration into the objects of the `config` namespace.
    ///
    /// # Errors
    ///
    /// Returns every missing file and object failure, aggregated.
    pub fn load_config(&self, request: &LoadConfigRequest) -> Result<(), ConfigError> {
        self.core.load_config(request)
    }

    /// Loads configuration, starts every namespace and autowires
    /// dependencies.
    ///
    /// Only the first successful call does any work unless
    /// [`LoadRequest::force_reload`] is set. Concurrent callers wait for the
    /// running load to finish. Must not be called from a lifecycle hook, but
    /// [`Container::is_loaded`] may be.
    ///
    /// # Errors
    ///
    /// Returns the first stage that failed. The container stays unloaded.
    pub fn load(&self, request: &LoadRequest) -> Result<(), ContainerError> {
        self.core.load(request)
    }

    pub fn is_loaded(&self) -> bool {
        self.core.is_loaded()
    }

    /// Runs the shutdown hooks of every namespace in startup order. A
    /// following [`Container::load`] starts the container again.
    pub fn shutdown(&self, ctx: &ShutdownContext) {
        self.core.shutdown(ctx)
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        self.core.dependency_graph()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::lifecycle::LifecycleState;
    use crate::prelude::*;

    use super::*;

    type Journal = Arc<Mutex<Vec<String>>>;

    #[derive(Autowire)]
    struct Tracker {
        name: String,
        priority: i32,
        journal: Journal,
    }

    impl Tracker {
        fn new(name: &str, priority: i32, journal: &Journal) -> Self {
            Self {
                name: name.to_owned(),
                priority,
                journal: Arc::clone(journal),
            }
        }
    }

    impl Object for Tracker {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn init(&self) -> Result<(), BoxError> {
            self.journal.lock().push(format!("init {}", self.name));
            Ok(())
        }

        fn close(&self, _ctx: &ShutdownContext) {
            self.journal.lock().push(format!("close {}", self.name));
        }
    }

    #[test]
    fn container_has_builtin_namespaces_in_startup_order() {
        let container = Container::new();
        let names: Vec<_> = container
            .namespaces()
            .iter()
            .map(|store| store.namespace().to_owned())
            .collect();
        assert_eq!(names, ["config", "controllers", "default", "api"]);
    }

    #[test]
    fn container_creates_namespaces_on_first_use() {
        let container = Container::new();
        let jobs = container.namespace("jobs");
        assert_eq!(jobs.priority(), crate::container::USER_PRIORITY);
        assert!(Arc::ptr_eq(&jobs, &container.namespace("jobs")));

        container.register_namespace("jobs", 50);
        let names: Vec<_> = container
            .namespaces()
            .iter()
            .map(|store| store.namespace().to_owned())
            .collect();
        assert_eq!(names, ["config", "controllers", "jobs", "default", "api"]);
    }

    #[test]
    fn container_init_and_shutdown_follow_namespace_priority() {
        let journal = Journal::default();
        let container = Container::new();
        container
            .registry(API_NAMESPACE, Tracker::new("handler", 0, &journal))
            .unwrap();
        container
            .registry(DEFAULT_NAMESPACE, Tracker::new("service", 0, &journal))
            .unwrap();
        container
            .registry(CONFIG_NAMESPACE, Tracker::new("settings", 0, &journal))
            .unwrap();

        container.init().unwrap();
        container.shutdown(&ShutdownContext::background());

        assert_eq!(
            *journal.lock(),
            [
                "init settings",
                "init service",
                "init handler",
                "close settings",
                "close service",
                "close handler",
            ]
        );
    }

    #[test]
    fn container_load_is_idempotent() {
        let journal = Journal::default();
        let container = Container::new();
        container
            .registry(DEFAULT_NAMESPACE, Tracker::new("service", 0, &journal))
            .unwrap();

        container.load(&LoadRequest::new()).unwrap();
        container.load(&LoadRequest::new()).unwrap();
        assert!(container.is_loaded());
        assert_eq!(*journal.lock(), ["init service"]);

        container.load(&LoadRequest::new().force_reload(true)).unwrap();
        assert_eq!(*journal.lock(), ["init service", "init service"]);
    }

    #[test]
    fn container_load_serializes_concurrent_callers() {
        let journal = Journal::default();
        let container = Container::new();
        container
            .registry(DEFAULT_NAMESPACE, Tracker::new("service", 0, &journal))
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                thread::spawn(move || container.load(&LoadRequest::new()).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*journal.lock(), ["init service"]);
        assert_eq!(
            container.default_namespace().state("service"),
            Some(LifecycleState::Running)
        );
    }

    #[test]
    fn container_require_distinguishes_failures() {
        let journal = Journal::default();
        let container = Container::new();
        container
            .registry(DEFAULT_NAMESPACE, Tracker::new("service", 0, &journal))
            .unwrap();

        assert!(container.require::<Tracker>(DEFAULT_NAMESPACE, "service").is_ok());
        assert!(matches!(
            container.require::<Tracker>("missing", "service"),
            Err(LookupError::NotFound { .. })
        ));
        assert!(matches!(
            container.require::<String>(DEFAULT_NAMESPACE, "service"),
            Err(LookupError::TypeMismatch { .. })
        ));
        assert!(container.get("missing", "service").is_none());
    }

    #[test]
    fn container_get_with_honors_version() {
        let journal = Journal::default();
        let container = Container::new();
        container
            .registry(DEFAULT_NAMESPACE, Tracker::new("service", 0, &journal))
            .unwrap();

        let options = GetOptions::new().version("1.0.0");
        assert!(container.get_with(DEFAULT_NAMESPACE, "service", &options).is_some());
        let options = GetOptions::new().version("2.0.0");
        assert!(container.get_with(DEFAULT_NAMESPACE, "service", &options).is_none());
    }

    #[derive(Autowire)]
    struct LoadWatcher {
        container: Mutex<Option<Container>>,
        seen: Mutex<Option<bool>>,
    }

    impl Object for LoadWatcher {
        fn name(&self) -> &str {
            "watcher"
        }

        fn init(&self) -> Result<(), BoxError> {
            let container = self.container.lock().clone();
            if let Some(container) = container {
                *self.seen.lock() = Some(container.is_loaded());
            }
            Ok(())
        }
    }

    #[test]
    fn container_is_loaded_may_be_read_from_a_hook() {
        let container = Container::new();
        let watcher = Arc::new(LoadWatcher {
            container: Mutex::new(Some(container.clone())),
            seen: Mutex::new(None),
        });
        container
            .default_namespace()
            .registry_shared(Arc::clone(&watcher) as Arc<dyn Object>)
            .unwrap();

        let (sender, receiver) = oneshot::channel();
        let worker = container.clone();
        thread::spawn(move || {
            let _ = sender.send(worker.load(&LoadRequest::new()).is_ok());
        });
        let loaded = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("is_loaded blocked inside a hook");

        assert!(loaded);
        assert_eq!(*watcher.seen.lock(), Some(false));
        assert!(container.is_loaded());
        watcher.container.lock().take();
    }
}
