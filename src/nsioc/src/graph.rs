//! Dependency introspection.
//!
//! Edges come from two places: fields annotated with `#[ioc(...)]` and
//! [`Object::declare_dependencies`] for objects that fetch their
//! dependencies imperatively.
//!
//! [`Object::declare_dependencies`]: crate::object::Object::declare_dependencies

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::autowire::{InjectPoint, Resolver};
use crate::container::namespace::GetOptions;
use crate::tag::InjectTag;
use crate::util::type_name::short_type_name;

/// One edge of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyInfo {
    pub name: String,
    pub namespace: String,
    pub field_name: String,
}

impl DependencyInfo {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            field_name: field_name.into(),
        }
    }

    /// Derives edges from autowired fields. Fields with an invalid tag or
    /// with autowiring disabled are left out.
    pub(crate) fn from_inject_points(namespace: &str, points: &[InjectPoint<'_>]) -> Vec<Self> {
        points
            .iter()
            .filter_map(|point| {
                let tag = InjectTag::parse_in(point.tag(), namespace).ok()?;
                if !tag.autowire {
                    return None;
                }
                let name = if tag.name.is_empty() {
                    short_type_name(point.slot().target_type_name()).to_owned()
                } else {
                    tag.name
                };
                Some(Self::new(name, tag.namespace, point.field()))
            })
            .collect()
    }
}

/// The outgoing edges of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDependencies {
    namespace: String,
    object: String,
    dependencies: Vec<DependencyInfo>,
}

impl ObjectDependencies {
    pub fn new(
        namespace: impl Into<String>,
        object: impl Into<String>,
        dependencies: Vec<DependencyInfo>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            object: object.into(),
            dependencies,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn dependencies(&self) -> &[DependencyInfo] {
        &self.dependencies
    }
}

/// A snapshot of every object's dependencies, with each edge checked
/// against the container.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    objects: Vec<ObjectDependencies>,
    resolved: Vec<Vec<bool>>,
}

impl DependencyGraph {
    pub fn build(objects: Vec<ObjectDependencies>, resolver: &dyn Resolver) -> Self {
        let options = GetOptions::new();
        let resolved = objects
            .iter()
            .map(|object| {
                object
                    .dependencies
                    .iter()
                    .map(|dep| resolver.resolve(&dep.namespace, &dep.name, &options).is_some())
                    .collect()
            })
            .collect();
        Self { objects, resolved }
    }

    pub fn objects(&self) -> &[ObjectDependencies] {
        &self.objects
    }

    /// Returns every edge whose target isn't registered.
    pub fn unresolved(&self) -> Vec<(&ObjectDependencies, &DependencyInfo)> {
        self.edges()
            .filter(|(_, _, resolved)| !resolved)
            .map(|(object, dep, _)| (object, dep))
            .collect()
    }

    /// Returns the objects that depend on `namespace/name`.
    pub fn dependents_of(&self, namespace: &str, name: &str) -> Vec<&ObjectDependencies> {
        self.objects
            .iter()
            .filter(|object| {
                object
                    .dependencies
                    .iter()
                    .any(|dep| dep.namespace == namespace && dep.name == name)
            })
            .collect()
    }

    fn edges(&self) -> impl Iterator<Item = (&ObjectDependencies, &DependencyInfo, bool)> {
        self.objects
            .iter()
            .zip(&self.resolved)
            .flat_map(|(object, resolved)| {
                object
                    .dependencies
                    .iter()
                    .zip(resolved)
                    .map(move |(dep, resolved)| (object, dep, *resolved))
            })
    }
}

impl Display for DependencyGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (object, resolved) in self.objects.iter().zip(&self.resolved) {
            writeln!(f, "{}/{}", object.namespace, object.object)?;
            for (dep, resolved) in object.dependencies.iter().zip(resolved) {
                let field = if dep.field_name.is_empty() {
                    "<declared>"
                } else {
                    dep.field_name.as_str()
                };
                let status = if *resolved { "" } else { " (missing)" };
                writeln!(f, "  {field} -> {}/{}{status}", dep.namespace, dep.name)?;
            }
        }
        Ok(())
    }
}
