//! Field injection driven by `#[derive(Autowire)]`.
//!
//! The derive macro turns every field annotated with `#[ioc("...")]` into an
//! [`InjectPoint`], and the struct-level `#[ioc(provides(...))]` attribute
//! into [`Autowire::upcast`] arms. The engine walks the inject points of
//! every object in a namespace and fills the slots from the container.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use nsioc::prelude::*;
//!
//! trait Repository: Send + Sync {
//!     fn find(&self) -> &'static str;
//! }
//!
//! #[derive(Autowire)]
//! #[ioc(provides(dyn Repository))]
//! struct MemoryRepository;
//!
//! impl Repository for MemoryRepository {
//!     fn find(&self) -> &'static str {
//!         "found"
//!     }
//! }
//!
//! impl Object for MemoryRepository {
//!     fn name(&self) -> &str {
//!         "repository"
//!     }
//! }
//!
//! #[derive(Autowire)]
//! struct Handler {
//!     #[ioc("autowire=true;namespace=default;name=repository")]
//!     repository: Autowired<dyn Repository>,
//! }
//!
//! impl Object for Handler {
//!     fn name(&self) -> &str {
//!         "handler"
//!     }
//! }
//!
//! let container = Container::new();
//! container.default_namespace().registry(MemoryRepository).unwrap();
//! container.api().registry(Handler { repository: Autowired::new() }).unwrap();
//! container.autowire().unwrap();
//!
//! let handler: Arc<Handler> = container.get_as("api", "handler").unwrap();
//! assert_eq!(handler.repository.get().unwrap().find(), "found");
//! ```

mod engine;
mod slot;

use std::any::{Any, TypeId};
use std::sync::Arc;

use snafu::prelude::*;

use crate::tag::TagError;
use crate::util::display::AggregatedDisplayer;

pub use engine::{autowire_object, Resolver};
pub use slot::{Autowired, InjectSlot};

#[cfg(test)]
pub use engine::MockResolver;

/// Injection metadata of a type, usually generated by `#[derive(Autowire)]`.
pub trait Autowire {
    /// Lists the fields that take part in autowiring.
    fn inject_points(&self) -> Vec<InjectPoint<'_>>;

    /// Views `self` as `Arc<T>` where `TypeId::of::<T>() == target`, boxed
    /// as `Box<Arc<T>>`. Returns `None` if the type can't be viewed as the
    /// target.
    fn upcast(self: Arc<Self>, target: TypeId) -> Option<Box<dyn Any + Send + Sync>>;
}

/// One injectable field of an object.
#[derive(Clone, Copy)]
pub struct InjectPoint<'a> {
    field: &'static str,
    tag: &'static str,
    slot: &'a dyn InjectSlot,
}

impl<'a> InjectPoint<'a> {
    pub fn new(field: &'static str, tag: &'static str, slot: &'a dyn InjectSlot) -> Self {
        Self { field, tag, slot }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn slot(&self) -> &'a dyn InjectSlot {
        self.slot
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum AutowireError {
    #[snafu(display("invalid tag on field `{field}` of {namespace}/{object}"))]
    #[non_exhaustive]
    InvalidTag {
        namespace: String,
        object: String,
        field: &'static str,
        source: TagError,
    },
    #[snafu(display(
        "namespace {target_namespace} required by field `{field}` of {namespace}/{object} does not exist"
    ))]
    #[non_exhaustive]
    NamespaceNotFound {
        namespace: String,
        object: String,
        field: &'static str,
        target_namespace: String,
    },
    #[snafu(display(
        "dependency {target_namespace}/{target} of field `{field}` in {namespace}/{object} is not registered"
    ))]
    #[non_exhaustive]
    DependencyNotFound {
        namespace: String,
        object: String,
        field: &'static str,
        target_namespace: String,
        target: String,
    },
    #[snafu(display(
        "dependency {target_namespace}/{target} can't be injected into field `{field}` of {namespace}/{object} which expects `{expected}`"
    ))]
    #[non_exhaustive]
    TypeMismatch {
        namespace: String,
        object: String,
        field: &'static str,
        target_namespace: String,
        target: String,
        expected: &'static str,
    },
    #[snafu(display("aggregated autowire errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<AutowireError> },
}

impl AutowireError {
    /// Collapses a list of errors, keeping a single error as it is.
    pub(crate) fn aggregate(mut errors: Vec<AutowireError>) -> Result<(), AutowireError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(AutowireError::Aggregated { errors }),
        }
    }

    /// Returns every leaf error, flattening aggregated ones.
    pub fn flatten(&self) -> Vec<&AutowireError> {
        match self {
            Self::Aggregated { errors } => errors.iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
