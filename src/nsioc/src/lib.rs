#![allow(clippy::new_without_default)]

extern crate self as nsioc;

pub mod autowire;
pub mod config;
pub mod container;
pub mod graph;
pub mod lifecycle;
pub mod object;
pub mod tag;
pub mod version;
mod util;

pub use nsioc_derive::Autowire;

pub mod prelude {
    pub use crate::autowire::{Autowire, AutowireError, Autowired};
    pub use crate::config::{ConfigError, ConfigSource, LoadConfigRequest, LoadRequest};
    pub use crate::container::namespace::{GetOptions, NamespaceStore, RegistryError};
    pub use crate::container::{Container, ContainerError, LookupError};
    pub use crate::graph::DependencyInfo;
    pub use crate::lifecycle::ShutdownContext;
    pub use crate::object::{BoxError, Object};
    pub use crate::Autowire;
}
