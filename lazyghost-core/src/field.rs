//! Field descriptors
//!
//! A [`Field`] describes one property of a class shape: its name, its byte
//! offset inside the containing struct, its marker attributes, and a
//! [`FieldVTable`] bundling the monomorphized type-erased operations the
//! ghost machinery needs (write-with-downcast, borrow-as-any, drop, and an
//! optional default constructor).

use core::{any::Any, fmt};

use crate::{AnyValue, FieldAttribute, PtrConst, PtrMut, PtrUninit};

/// Describes a field in a class shape.
#[derive(Clone, Copy)]
pub struct Field {
    /// Name of the field, which doubles as the constructor parameter name.
    pub name: &'static str,

    /// Offset of the field in the struct (obtained through
    /// `core::mem::offset_of`).
    pub offset: usize,

    /// Marker attributes set on the field.
    pub attributes: &'static [FieldAttribute],

    /// Doc comments.
    pub doc: &'static [&'static str],

    /// Type-erased operations for the field's concrete type.
    pub vtable: FieldVTable,
}

impl Field {
    /// Returns a builder for Field.
    pub const fn builder() -> FieldBuilder {
        FieldBuilder::new()
    }

    /// Checks whether the field carries an attribute with the given namespace
    /// and key.
    ///
    /// Use `None` for builtin attributes, `Some("ns")` for namespaced ones.
    #[inline]
    pub fn has_attr(&self, ns: Option<&str>, key: &str) -> bool {
        self.attributes
            .iter()
            .any(|attr| attr.ns == ns && attr.key == key)
    }

    /// Checks whether the field carries a builtin attribute with the given key.
    #[inline]
    pub fn has_builtin_attr(&self, key: &str) -> bool {
        self.has_attr(None, key)
    }

    /// Checks whether the field carries the given marker.
    #[inline]
    pub fn is_marked(&self, tag: &FieldAttribute) -> bool {
        self.has_attr(tag.ns, tag.key)
    }

    /// Returns true if this field has a declared default value.
    #[inline]
    pub fn has_default(&self) -> bool {
        self.vtable.default_in_place.is_some()
    }

    /// The type name of the field's concrete type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        (self.vtable.type_name)()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type", &self.type_name())
            .field("offset", &self.offset)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Type-erased operations on a field of a concrete type `F`.
///
/// Built once per field type via [`FieldVTable::of`] (or
/// [`FieldVTable::of_with_default`] when `F: Default`); every function in
/// here is a monomorphized instance of one of the generic helpers below.
#[derive(Clone, Copy)]
pub struct FieldVTable {
    /// Downcasts an [`AnyValue`] to the field type and writes it in place.
    ///
    /// # Safety
    ///
    /// The pointer must be properly aligned for the field type and point to
    /// allocated, writable, uninitialized memory.
    pub write: for<'mem> unsafe fn(PtrUninit<'mem>, AnyValue) -> Result<PtrMut<'mem>, FieldError>,

    /// Borrows the field as `&dyn Any`.
    ///
    /// # Safety
    ///
    /// The pointer must point to an initialized value of the field type.
    pub borrow: for<'mem> unsafe fn(PtrConst<'mem>) -> &'mem dyn Any,

    /// Drops the field value in place.
    ///
    /// # Safety
    ///
    /// The pointer must point to an initialized value of the field type,
    /// which must not be accessed again afterwards.
    pub drop_in_place: for<'mem> unsafe fn(PtrMut<'mem>) -> PtrUninit<'mem>,

    /// Writes the field type's `Default` value in place, if the field
    /// declares one.
    ///
    /// # Safety
    ///
    /// Same contract as `write`.
    pub default_in_place: Option<for<'mem> unsafe fn(PtrUninit<'mem>) -> PtrMut<'mem>>,

    /// Reports the field type's name.
    pub type_name: fn() -> &'static str,
}

impl FieldVTable {
    /// The vtable for a field of type `F`.
    pub const fn of<F: Any>() -> Self {
        Self {
            write: write_value::<F>,
            borrow: borrow_value::<F>,
            drop_in_place: drop_value::<F>,
            default_in_place: None,
            type_name: core::any::type_name::<F>,
        }
    }

    /// The vtable for a field of type `F` with a `Default`-provided value.
    pub const fn of_with_default<F: Any + Default>() -> Self {
        let mut vtable = Self::of::<F>();
        vtable.default_in_place = Some(default_value::<F>);
        vtable
    }
}

impl fmt::Debug for FieldVTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldVTable")
            .field("type", &(self.type_name)())
            .field("has_default", &self.default_in_place.is_some())
            .finish()
    }
}

unsafe fn write_value<'mem, F: Any>(
    ptr: PtrUninit<'mem>,
    value: AnyValue,
) -> Result<PtrMut<'mem>, FieldError> {
    let value = value.downcast::<F>().map_err(|value| FieldError::TypeMismatch {
        expected: core::any::type_name::<F>(),
        actual: value.type_name(),
    })?;
    // SAFETY: caller upholds the `write` contract; the downcast proved the
    // payload is an `F`.
    Ok(unsafe { ptr.put(value) })
}

unsafe fn borrow_value<'mem, F: Any>(ptr: PtrConst<'mem>) -> &'mem dyn Any {
    // SAFETY: caller upholds the `borrow` contract.
    unsafe { ptr.get::<F>() }
}

unsafe fn drop_value<'mem, F: Any>(ptr: PtrMut<'mem>) -> PtrUninit<'mem> {
    // SAFETY: caller upholds the `drop_in_place` contract.
    unsafe { ptr.drop_in_place::<F>() }
}

unsafe fn default_value<'mem, F: Any + Default>(ptr: PtrUninit<'mem>) -> PtrMut<'mem> {
    // SAFETY: caller upholds the `write` contract.
    unsafe { ptr.put(F::default()) }
}

/// Builder for Field.
pub struct FieldBuilder {
    name: Option<&'static str>,
    offset: Option<usize>,
    attributes: &'static [FieldAttribute],
    doc: &'static [&'static str],
    vtable: Option<FieldVTable>,
}

impl FieldBuilder {
    /// Creates a new FieldBuilder.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            name: None,
            offset: None,
            attributes: &[],
            doc: &[],
            vtable: None,
        }
    }

    /// Sets the name for the Field.
    pub const fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the offset for the Field.
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the attributes for the Field.
    pub const fn attributes(mut self, attributes: &'static [FieldAttribute]) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the doc comments for the Field.
    pub const fn doc(mut self, doc: &'static [&'static str]) -> Self {
        self.doc = doc;
        self
    }

    /// Sets the vtable for the Field.
    pub const fn vtable(mut self, vtable: FieldVTable) -> Self {
        self.vtable = Some(vtable);
        self
    }

    /// Builds the Field.
    pub const fn build(self) -> Field {
        Field {
            name: self.name.unwrap(),
            offset: self.offset.unwrap(),
            attributes: self.attributes,
            doc: self.doc,
            vtable: self.vtable.unwrap(),
        }
    }
}

/// Errors encountered when resolving or writing a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A lookup by name found no field with the given key.
    NoSuchField,

    /// A value could not be written into a field because its type does not
    /// match the field's declared type.
    TypeMismatch {
        /// The field's declared type.
        expected: &'static str,

        /// What someone tried to write into it.
        actual: &'static str,
    },
}

impl core::error::Error for FieldError {}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::NoSuchField => write!(f, "no such field"),
            FieldError::TypeMismatch { expected, actual } => {
                write!(f, "expected type {expected}, got {actual}")
            }
        }
    }
}
