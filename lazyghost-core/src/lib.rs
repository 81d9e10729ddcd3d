#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

#[cfg(feature = "alloc")]
extern crate alloc;

// Opaque pointer utilities
mod ptr;
pub use ptr::*;

// Type-erased owned values
#[cfg(feature = "alloc")]
mod value;
#[cfg(feature = "alloc")]
pub use value::*;

// Field marker attributes
mod attr;
pub use attr::*;

// Field descriptors and vtables
#[cfg(feature = "alloc")]
mod field;
#[cfg(feature = "alloc")]
pub use field::*;

// Class shapes
#[cfg(feature = "alloc")]
mod shape;
#[cfg(feature = "alloc")]
pub use shape::*;

#[cfg(feature = "alloc")]
mod macros;

/// A type with a static class shape, eligible for ghost construction.
///
/// Implemented by the [`ghost_class!`] macro; hand-written impls are
/// possible but carry the safety obligation below.
///
/// # Safety
///
/// `SHAPE` must describe `Self` accurately: every listed field must exist on
/// `Self` with the given name, at the given byte offset, with a vtable built
/// for the field's actual type. The ghost machinery writes and drops fields
/// through these descriptors.
#[cfg(feature = "alloc")]
pub unsafe trait GhostClass: Sized + 'static {
    /// The static descriptor of this class.
    const SHAPE: &'static Shape;
}
