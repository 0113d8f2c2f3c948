use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::autowire::{AutowireError, Resolver};
use crate::config::{self, ConfigError, LoadConfigRequest, LoadRequest};
use crate::container::namespace::{GetOptions, NamespaceStore};
use crate::container::{
    AutowireSnafu, ConfigSnafu, ContainerError, LifecycleSnafu, API_NAMESPACE, API_PRIORITY,
    CONFIG_NAMESPACE, CONFIG_PRIORITY, CONTROLLER_NAMESPACE, CONTROLLER_PRIORITY,
    DEFAULT_NAMESPACE, DEFAULT_PRIORITY, USER_PRIORITY,
};
use crate::graph::DependencyGraph;
use crate::lifecycle::ShutdownContext;
use crate::object::Object;

pub struct ContainerCore {
    namespaces: RwLock<Vec<Arc<NamespaceStore>>>,
    // Held for a whole load. `loaded` stays readable meanwhile.
    load_lock: Mutex<()>,
    loaded: AtomicBool,
}

impl ContainerCore {
    pub fn new() -> Self {
        let builtin = [
            (CONFIG_NAMESPACE, CONFIG_PRIORITY),
            (CONTROLLER_NAMESPACE, CONTROLLER_PRIORITY),
            (DEFAULT_NAMESPACE, DEFAULT_PRIORITY),
            (API_NAMESPACE, API_PRIORITY),
        ];
        let namespaces = builtin
            .into_iter()
            .map(|(name, priority)| Arc::new(NamespaceStore::new(name, priority)))
            .collect();
        Self {
            namespaces: RwLock::new(namespaces),
            load_lock: Mutex::new(()),
            loaded: AtomicBool::new(false),
        }
    }

    pub fn find_namespace(&self, name: &str) -> Option<Arc<NamespaceStore>> {
        self.namespaces
            .read()
            .iter()
            .find(|store| store.namespace() == name)
            .cloned()
    }

    /// Returns the namespace called `name`, creating it with the default user
    /// priority if it doesn't exist yet.
    pub fn namespace(&self, name: &str) -> Arc<NamespaceStore> {
        if let Some(store) = self.find_namespace(name) {
            return store;
        }

        let mut namespaces = self.namespaces.write();
        if let Some(store) = namespaces.iter().find(|store| store.namespace() == name) {
            return Arc::clone(store);
        }
        let store = Arc::new(NamespaceStore::new(name, USER_PRIORITY));
        namespaces.push(Arc::clone(&store));
        debug!(namespace = name, priority = USER_PRIORITY, "created namespace");
        store
    }

    /// Creates the namespace `name` with `priority`, or changes the priority
    /// of an existing one.
    pub fn register_namespace(&self, name: &str, priority: i32) -> Arc<NamespaceStore> {
        let store = self.namespace(name);
        store.set_priority(priority);
        debug!(namespace = name, priority, "registered namespace");
        store
    }

    /// Returns every namespace, highest priority first. Namespaces with equal
    /// priorities keep their creation order.
    pub fn namespaces(&self) -> Vec<Arc<NamespaceStore>> {
        let mut namespaces = self.namespaces.read().clone();
        namespaces.sort_by_key(|store| Reverse(store.priority()));
        namespaces
    }

    pub fn get(&self, namespace: &str, name: &str, options: &GetOptions) -> Option<Arc<dyn Object>> {
        self.find_namespace(namespace)?.get(name, options)
    }

    pub fn load_config(&self, request: &LoadConfigRequest) -> Result<(), ConfigError> {
        config::load_config(&self.namespace(CONFIG_NAMESPACE), request)
    }

    pub fn init(&self) -> Result<(), ContainerError> {
        for store in self.namespaces() {
            store.init().context(LifecycleSnafu {
                namespace: store.namespace(),
            })?;
        }
        Ok(())
    }

    /// Autowires every namespace. Errors of all namespaces are collected into
    /// a single flat list.
    pub fn autowire(&self) -> Result<(), AutowireError> {
        let mut errors = Vec::new();
        for store in self.namespaces() {
            match store.autowire(self) {
                Ok(()) => {}
                Err(AutowireError::Aggregated { errors: inner }) => errors.extend(inner),
                Err(err) => errors.push(err),
            }
        }
        AutowireError::aggregate(errors)
    }

    /// Runs the full startup sequence once. Later calls return immediately
    /// unless `request.force_reload` is set.
    pub fn load(&self, request: &LoadRequest) -> Result<(), ContainerError> {
        let _guard = self.load_lock.lock();
        if self.is_loaded() && !request.force_reload {
            debug!("container already loaded, skipping");
            return Ok(());
        }

        info!(force_reload = request.force_reload, "loading container");
        self.load_config(&request.config).context(ConfigSnafu)?;
        self.init()?;
        self.autowire().context(AutowireSnafu)?;

        self.loaded.store(true, Ordering::Release);
        info!(namespaces = self.namespaces.read().len(), "container loaded");
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Closes every namespace in the same order as startup.
    pub fn shutdown(&self, ctx: &ShutdownContext) {
        info!(deadline = ?ctx.remaining(), "shutting down container");
        for store in self.namespaces() {
            store.close(ctx);
        }
        self.loaded.store(false, Ordering::Release);
        info!("container shut down");
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        let objects = self
            .namespaces()
            .iter()
            .flat_map(|store| store.dependencies())
            .collect();
        DependencyGraph::build(objects, self)
    }
}

impl Resolver for ContainerCore {
    fn resolve(&self, namespace: &str, name: &str, options: &GetOptions) -> Option<Arc<dyn Object>> {
        self.get(namespace, name, options)
    }

    fn has_namespace(&self, namespace: &str) -> bool {
        self.find_namespace(namespace).is_some()
    }
}
