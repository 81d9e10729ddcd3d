use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use lazyghost_core::FieldError;

/// Errors that can occur when building or touching a lazy ghost.
#[derive(Debug)]
pub enum GhostError {
    /// The shape handed to the factory does not describe a class.
    NotAClass {
        /// The shape's type name.
        type_name: &'static str,
    },

    /// The class exposes no constructor.
    NotConstructible {
        /// The class name.
        class: &'static str,
    },

    /// A constructor parameter is not mirrored by a same-named field.
    ParameterNotPromoted {
        /// The class name.
        class: &'static str,
        /// The offending parameter.
        parameter: &'static str,
    },

    /// A property was declared lazy but the class does not tag it as such.
    NotMarkedLazy {
        /// The class name.
        class: &'static str,
        /// The offending property.
        property: String,
    },

    /// A named property does not exist on the class.
    UnknownProperty {
        /// The class name.
        class: &'static str,
        /// The offending name.
        property: String,
    },

    /// The declared eager/lazy/group property names do not add up to exactly
    /// the class's required constructor parameters: too few, too many,
    /// overlapping, or mismatched.
    IncompleteConstructionArguments {
        /// The class name.
        class: &'static str,
    },

    /// At first touch, a required parameter had no producer and no group.
    /// Unreachable when reconciliation passed; an invariant violation.
    MissingConstructionArgument {
        /// The class name.
        class: &'static str,
        /// The uncovered parameter.
        parameter: &'static str,
    },

    /// A group's producer returned a key set that does not match its
    /// declared property names.
    GroupProducerMismatch {
        /// The declared property names, sorted.
        expected: Vec<String>,
        /// The names the producer actually returned, sorted.
        actual: Vec<String>,
    },

    /// A resolved value could not be written into its property because of a
    /// type mismatch.
    IncompatibleLazyValue {
        /// The property being written.
        property: &'static str,
        /// The underlying field write failure.
        source: FieldError,
    },

    /// A typed read asked for a type other than the field's declared type.
    TypeMismatch {
        /// The property being read.
        property: &'static str,
        /// The field's declared type.
        expected: &'static str,
        /// The type the caller asked for.
        actual: &'static str,
    },

    /// `lazy_group_properties` was called with no property names.
    EmptyLazyGroup {
        /// The class name.
        class: &'static str,
    },

    /// A producer re-entered the ghost it is initializing and touched a
    /// still-pending property.
    RecursiveInitialization {
        /// The class name.
        class: &'static str,
    },

    /// The deferred initializer ran and failed; the ghost will never become
    /// initialized. Eager properties remain readable.
    Poisoned {
        /// The class name.
        class: &'static str,
    },

    /// An invariant of the ghost machinery was violated.
    InvariantViolation,
}

impl fmt::Display for GhostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GhostError::NotAClass { type_name } => {
                write!(f, "{type_name} is not a constructible class")
            }
            GhostError::NotConstructible { class } => {
                write!(f, "class {class} exposes no constructor")
            }
            GhostError::ParameterNotPromoted { class, parameter } => {
                write!(
                    f,
                    "constructor parameter {parameter} of {class} is not mirrored by a property"
                )
            }
            GhostError::NotMarkedLazy { class, property } => {
                write!(f, "property {property} of {class} is not marked lazy")
            }
            GhostError::UnknownProperty { class, property } => {
                write!(f, "class {class} has no property named {property}")
            }
            GhostError::IncompleteConstructionArguments { class } => {
                write!(
                    f,
                    "declared properties do not exactly cover the constructor parameters of {class}"
                )
            }
            GhostError::MissingConstructionArgument { class, parameter } => {
                write!(
                    f,
                    "no producer or group covers constructor parameter {parameter} of {class}"
                )
            }
            GhostError::GroupProducerMismatch { expected, actual } => {
                write!(f, "group producer returned [")?;
                for (i, name) in actual.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    f.write_str(name)?;
                }
                write!(f, "], declared [")?;
                for (i, name) in expected.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    f.write_str(name)?;
                }
                write!(f, "]")
            }
            GhostError::IncompatibleLazyValue { property, source } => {
                write!(f, "resolved value for property {property} has the wrong type: {source}")
            }
            GhostError::TypeMismatch {
                property,
                expected,
                actual,
            } => {
                write!(f, "property {property} is a {expected}, asked for {actual}")
            }
            GhostError::EmptyLazyGroup { class } => {
                write!(f, "lazy group on {class} declares no properties")
            }
            GhostError::RecursiveInitialization { class } => {
                write!(f, "producer re-entered the ghost of {class} during initialization")
            }
            GhostError::Poisoned { class } => {
                write!(f, "ghost of {class} is poisoned: its initializer already ran and failed")
            }
            GhostError::InvariantViolation => write!(f, "invariant violation"),
        }
    }
}

impl core::error::Error for GhostError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            GhostError::IncompatibleLazyValue { source, .. } => Some(source),
            _ => None,
        }
    }
}
