use std::sync::Arc;

use snafu::prelude::*;
use tracing::{debug, trace};

use crate::autowire::{
    AutowireError, DependencyNotFoundSnafu, InjectPoint, InvalidTagSnafu, NamespaceNotFoundSnafu,
    TypeMismatchSnafu,
};
use crate::container::namespace::GetOptions;
use crate::object::Object;
use crate::tag::InjectTag;
use crate::util::type_name::short_type_name;

/// Looks up objects across namespaces on behalf of the autowire engine.
#[cfg_attr(test, mockall::automock)]
pub trait Resolver: Send + Sync {
    /// Returns the object registered as `name` in `namespace`, or `None` if
    /// either the namespace or the object doesn't exist.
    fn resolve(&self, namespace: &str, name: &str, options: &GetOptions)
        -> Option<Arc<dyn Object>>;

    fn has_namespace(&self, namespace: &str) -> bool;
}

/// Injects every autowired field of `object`, which lives in `namespace`.
///
/// Failures are appended to `errors` instead of stopping at the first one.
/// Returns the number of fields injected.
pub fn autowire_object(
    namespace: &str,
    object: &dyn Object,
    resolver: &dyn Resolver,
    errors: &mut Vec<AutowireError>,
) -> usize {
    let mut wired = 0;
    for point in object.inject_points() {
        match wire_point(namespace, object.name(), &point, resolver) {
            Ok(true) => wired += 1,
            Ok(false) => {}
            Err(err) => errors.push(err),
        }
    }
    wired
}

fn wire_point(
    namespace: &str,
    object: &str,
    point: &InjectPoint<'_>,
    resolver: &dyn Resolver,
) -> Result<bool, AutowireError> {
    let field = point.field();
    let tag = InjectTag::parse_in(point.tag(), namespace).context(InvalidTagSnafu {
        namespace,
        object,
        field,
    })?;

    if !tag.autowire {
        trace!(namespace, object, field, "field is not autowired");
        return Ok(false);
    }

    let slot = point.slot();
    let target = if tag.name.is_empty() {
        short_type_name(slot.target_type_name())
    } else {
        tag.name.as_str()
    };

    let options = if tag.has_explicit_version() {
        GetOptions::new().version(&tag.version)
    } else {
        GetOptions::new()
    };

    let Some(dependency) = resolver.resolve(&tag.namespace, target, &options) else {
        ensure!(
            resolver.has_namespace(&tag.namespace),
            NamespaceNotFoundSnafu {
                namespace,
                object,
                field,
                target_namespace: &tag.namespace,
            }
        );
        return DependencyNotFoundSnafu {
            namespace,
            object,
            field,
            target_namespace: &tag.namespace,
            target,
        }
        .fail();
    };

    let mismatch = TypeMismatchSnafu {
        namespace,
        object,
        field,
        target_namespace: &tag.namespace,
        target,
        expected: slot.target_type_name(),
    };
    let value = dependency.upcast(slot.target_type()).context(mismatch)?;
    if slot.assign(value).is_err() {
        return mismatch.fail();
    }

    debug!(
        namespace,
        object,
        field,
        dependency = %format_args!("{}/{}", tag.namespace, target),
        "autowired dependency"
    );
    Ok(true)
}
