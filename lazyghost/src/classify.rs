//! Object property classification.
//!
//! Resolves a class shape's ordered constructor parameter names against its
//! fields, and partitions the parameters into lazy-tagged and not.

use alloc::vec::Vec;

use lazyghost_core::{Field, FieldAttribute, Shape};

use crate::error::GhostError;
use crate::trace;

/// The classified constructor parameters of a class.
#[derive(Debug)]
pub(crate) struct Classified {
    /// `(field index, field)` per constructor parameter, in parameter order.
    pub(crate) parameters: Vec<(usize, &'static Field)>,
}

impl Classified {
    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.parameters.iter().map(|&(_, field)| field.name).collect()
    }

    /// Splits the parameters into (tagged, untagged) for the given marker.
    pub(crate) fn split_by_tag(
        &self,
        tag: &FieldAttribute,
    ) -> (Vec<&'static Field>, Vec<&'static Field>) {
        self.parameters
            .iter()
            .map(|&(_, field)| field)
            .partition(|field| field.is_marked(tag))
    }
}

/// Resolves the required constructor parameters of `shape`.
///
/// Fails with `NotConstructible` when the class exposes no constructor, and
/// with `ParameterNotPromoted` when a parameter has no same-named field.
pub(crate) fn constructor_parameters(shape: &'static Shape) -> Result<Classified, GhostError> {
    let class = shape.class_def().ok_or(GhostError::NotAClass {
        type_name: shape.type_name,
    })?;
    let Some(constructor) = class.constructor else {
        return Err(GhostError::NotConstructible {
            class: shape.type_name,
        });
    };

    let mut parameters = Vec::with_capacity(constructor.len());
    for &parameter in constructor {
        let entry = class
            .field(parameter)
            .ok_or(GhostError::ParameterNotPromoted {
                class: shape.type_name,
                parameter,
            })?;
        parameters.push(entry);
    }

    trace!(
        class = shape.type_name,
        parameters = parameters.len(),
        "classified constructor parameters"
    );
    Ok(Classified { parameters })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyghost_core::{ClassDefBuilder, GhostClass, ShapeBuilder, Ty, field_of, ghost_class};

    ghost_class! {
        struct Customer {
            id: u64,
            lazy orders: u32,
        }
    }

    #[test]
    fn parameters_in_declaration_order() {
        let classified = constructor_parameters(Customer::SHAPE).unwrap();
        assert_eq!(classified.names(), ["id", "orders"]);
        assert_eq!(classified.parameters[0].0, 0);
        assert_eq!(classified.parameters[1].0, 1);
    }

    #[test]
    fn splits_lazy_from_eager_capable() {
        let classified = constructor_parameters(Customer::SHAPE).unwrap();
        let (lazy, rest) = classified.split_by_tag(&FieldAttribute::LAZY);
        assert_eq!(lazy.len(), 1);
        assert_eq!(lazy[0].name, "orders");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "id");
    }

    struct NoConstructor {
        x: u32,
    }

    // SAFETY: field name, offset and vtable match the struct above.
    unsafe impl GhostClass for NoConstructor {
        const SHAPE: &'static Shape = &const {
            ShapeBuilder::new()
                .type_name("NoConstructor")
                .ty(Ty::Class(
                    ClassDefBuilder::new()
                        .fields(&const { [field_of!(NoConstructor, x: u32)] })
                        .build(),
                ))
                .build()
        };
    }

    #[test]
    fn no_constructor_is_not_constructible() {
        let err = constructor_parameters(NoConstructor::SHAPE).unwrap_err();
        assert!(matches!(err, GhostError::NotConstructible { class: "NoConstructor" }));
    }

    struct Unpromoted {
        x: u32,
    }

    // SAFETY: the one declared field matches the struct; "ghost" names no
    // field on purpose.
    unsafe impl GhostClass for Unpromoted {
        const SHAPE: &'static Shape = &const {
            ShapeBuilder::new()
                .type_name("Unpromoted")
                .ty(Ty::Class(
                    ClassDefBuilder::new()
                        .fields(&const { [field_of!(Unpromoted, x: u32)] })
                        .constructor(&["x", "ghost"])
                        .build(),
                ))
                .build()
        };
    }

    #[test]
    fn missing_field_is_not_promoted() {
        let err = constructor_parameters(Unpromoted::SHAPE).unwrap_err();
        assert!(matches!(
            err,
            GhostError::ParameterNotPromoted {
                class: "Unpromoted",
                parameter: "ghost"
            }
        ));
    }
}
