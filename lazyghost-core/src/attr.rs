//! Field attributes
//!
//! An attribute attaches a marker to a field of a class shape. The builtin
//! [`FieldAttribute::LAZY`] marker tags a field as lazily initializable;
//! libraries layering on top can declare their own namespaced markers and
//! point the ghost builder at them.

use core::fmt;

/// A marker attribute carried by a [`Field`](crate::Field).
///
/// Attributes are identified by an optional namespace plus a key, in the
/// spirit of `#[ghost(lazy)]` for builtins and `#[ghost(orm::lazy)]` for
/// extensions. They carry no payload: a marker is either present or absent.
#[derive(Clone, Copy)]
pub struct FieldAttribute {
    /// The namespace. `None` for builtin attributes.
    pub ns: Option<&'static str>,

    /// The key, e.g. `"lazy"`.
    pub key: &'static str,
}

impl FieldAttribute {
    /// The builtin marker for lazily initializable fields.
    pub const LAZY: Self = Self::builtin("lazy");

    /// Creates a new namespaced attribute.
    #[inline]
    pub const fn new(ns: &'static str, key: &'static str) -> Self {
        Self { ns: Some(ns), key }
    }

    /// Creates a new builtin (namespace-less) attribute.
    #[inline]
    pub const fn builtin(key: &'static str) -> Self {
        Self { ns: None, key }
    }

    /// Returns true if this is a builtin attribute (no namespace).
    #[inline]
    pub const fn is_builtin(&self) -> bool {
        self.ns.is_none()
    }
}

impl fmt::Debug for FieldAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ns {
            Some(ns) => write!(f, "{}::{}", ns, self.key),
            None => f.write_str(self.key),
        }
    }
}

impl PartialEq for FieldAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.ns == other.ns && self.key == other.key
    }
}

impl Eq for FieldAttribute {}
