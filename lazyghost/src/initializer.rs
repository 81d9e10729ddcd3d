//! The initializer compiler.
//!
//! Compiles the builder's accumulated producers into the one-shot deferred
//! callback bound to a ghost. The callback resolves every
//! required-but-deferred constructor parameter in declaration order —
//! individual producers first, then lazy groups with processed-id
//! de-duplication — and only then writes the resolved values into the
//! ghost's storage, so a failing producer leaves no partial wave of writes
//! behind it.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use lazyghost_core::{AnyValue, Field, GhostClass};

use crate::error::GhostError;
use crate::ghost::Ghost;
use crate::group::{GroupId, LazyGroup, Property};
use crate::trace;

/// A producer for one individually-lazy property.
pub(crate) type LazyProducer = Rc<dyn Fn() -> AnyValue>;

/// Compiles the deferred callback for a ghost of `T`.
///
/// `deferred` lists the constructor parameters the builder did not cover
/// eagerly, as `(field index, field)` in declaration order.
pub(crate) fn compile<T: GhostClass>(
    deferred: Vec<(usize, &'static Field)>,
    lazy: BTreeMap<String, LazyProducer>,
    groups: Vec<LazyGroup>,
) -> impl FnOnce(&Ghost<T>) -> Result<(), GhostError> + 'static {
    move |ghost: &Ghost<T>| {
        let class = ghost.shape().type_name;
        let mut resolved: Vec<(usize, AnyValue)> = Vec::with_capacity(deferred.len());
        let mut processed: BTreeSet<GroupId> = BTreeSet::new();
        let mut group_values: BTreeMap<String, AnyValue> = BTreeMap::new();

        for &(index, field) in &deferred {
            let name = field.name;
            if let Some(producer) = lazy.get(name) {
                trace!(class, property = name, "invoking lazy producer");
                let producer: &dyn Fn() -> AnyValue = producer.as_ref();
                resolved.push((index, producer()));
                continue;
            }

            let Some(group) = groups.iter().find(|group| group.has_property(name)) else {
                return Err(GhostError::MissingConstructionArgument {
                    class,
                    parameter: name,
                });
            };

            if !processed.contains(&group.id) {
                trace!(class, group = ?group.id, "invoking group producer");
                let producer: &dyn Fn() -> Vec<Property> = group.producer.as_ref();
                let produced = producer();

                let mut actual: Vec<String> =
                    produced.iter().map(|property| property.name().to_string()).collect();
                actual.sort_unstable();
                let mut expected = group.properties.clone();
                expected.sort_unstable();
                if actual != expected {
                    return Err(GhostError::GroupProducerMismatch { expected, actual });
                }

                processed.insert(group.id);
                for property in produced {
                    let (name, value) = property.into_parts();
                    group_values.insert(name, value);
                }
            }

            // The key-set check above proved the group delivered this name.
            let Some(value) = group_values.remove(name) else {
                return Err(GhostError::MissingConstructionArgument {
                    class,
                    parameter: name,
                });
            };
            resolved.push((index, value));
        }

        for (index, value) in resolved {
            ghost.raw_set(index, value)?;
        }
        Ok(())
    }
}
