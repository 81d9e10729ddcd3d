//! Class shapes
//!
//! A [`Shape`] is the static descriptor a [`GhostClass`](crate::GhostClass)
//! implementation hands to the ghost machinery: the type's name plus, for
//! constructible classes, a [`ClassDef`] listing the instance fields and the
//! ordered constructor parameter names. Shapes are `&'static` data, built
//! once per type (normally by the [`ghost_class!`](crate::ghost_class)
//! macro) and consulted at build and first-touch time.

use core::fmt;

use crate::{Field, FieldAttribute, FieldError};

/// Static descriptor of a type participating in ghost construction.
#[derive(Debug)]
pub struct Shape {
    /// The type's name, as spelled in source.
    pub type_name: &'static str,

    /// What kind of type this is.
    pub ty: Ty,
}

impl Shape {
    /// Returns a builder for Shape.
    pub const fn builder() -> ShapeBuilder {
        ShapeBuilder::new()
    }

    /// Returns true if this shape describes a class.
    #[inline]
    pub const fn is_class(&self) -> bool {
        matches!(self.ty, Ty::Class(_))
    }

    /// The class definition, if this shape describes a class.
    #[inline]
    pub fn class_def(&self) -> Option<&ClassDef> {
        match &self.ty {
            Ty::Class(def) => Some(def),
            Ty::Opaque => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// The kind of a [`Shape`].
#[derive(Debug)]
pub enum Ty {
    /// A class: a struct with named instance fields, constructible through
    /// the ghost builder.
    Class(ClassDef),

    /// Anything else. Opaque shapes cannot be ghost-built.
    Opaque,
}

/// Definition of a class: its fields and its constructor.
#[derive(Debug)]
pub struct ClassDef {
    /// The instance fields, in declaration order.
    pub fields: &'static [Field],

    /// The required constructor parameter names, in parameter order.
    ///
    /// `None` means the class exposes no constructor. Every parameter must
    /// be mirrored by a same-named field ("promoted"); fields absent from
    /// this list are expected to carry a default.
    pub constructor: Option<&'static [&'static str]>,
}

impl ClassDef {
    /// Returns a builder for ClassDef.
    pub const fn builder() -> ClassDefBuilder {
        ClassDefBuilder::new()
    }

    /// Looks up a field by name, returning its declaration index alongside.
    pub fn field(&self, name: &str) -> Option<(usize, &'static Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    /// Checks whether the named property carries the given marker.
    ///
    /// Fails with [`FieldError::NoSuchField`] if no such property exists —
    /// an unknown name is never reported as merely "not tagged".
    pub fn has_attr_on(&self, property: &str, tag: &FieldAttribute) -> Result<bool, FieldError> {
        let (_, field) = self.field(property).ok_or(FieldError::NoSuchField)?;
        Ok(field.is_marked(tag))
    }

    /// Checks whether every named property carries the given marker.
    ///
    /// Fails with [`FieldError::NoSuchField`] as soon as a name does not
    /// exist on the class.
    pub fn properties_have_attr(
        &self,
        properties: &[&str],
        tag: &FieldAttribute,
    ) -> Result<bool, FieldError> {
        for property in properties {
            if !self.has_attr_on(property, tag)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns true if the named field is a constructor parameter.
    pub fn is_constructor_parameter(&self, name: &str) -> bool {
        self.constructor
            .is_some_and(|parameters| parameters.contains(&name))
    }
}

/// Builder for Shape.
pub struct ShapeBuilder {
    type_name: Option<&'static str>,
    ty: Option<Ty>,
}

impl ShapeBuilder {
    /// Creates a new ShapeBuilder.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            type_name: None,
            ty: None,
        }
    }

    /// Sets the type name for the Shape.
    pub const fn type_name(mut self, type_name: &'static str) -> Self {
        self.type_name = Some(type_name);
        self
    }

    /// Sets the kind for the Shape.
    pub const fn ty(mut self, ty: Ty) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Builds the Shape.
    pub const fn build(self) -> Shape {
        Shape {
            type_name: self.type_name.unwrap(),
            ty: self.ty.unwrap(),
        }
    }
}

/// Builder for ClassDef.
pub struct ClassDefBuilder {
    fields: &'static [Field],
    constructor: Option<&'static [&'static str]>,
}

impl ClassDefBuilder {
    /// Creates a new ClassDefBuilder.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            fields: &[],
            constructor: None,
        }
    }

    /// Sets the fields for the ClassDef.
    pub const fn fields(mut self, fields: &'static [Field]) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the constructor parameter names for the ClassDef.
    pub const fn constructor(mut self, parameters: &'static [&'static str]) -> Self {
        self.constructor = Some(parameters);
        self
    }

    /// Builds the ClassDef.
    pub const fn build(self) -> ClassDef {
        ClassDef {
            fields: self.fields,
            constructor: self.constructor,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{FieldAttribute, FieldError, GhostClass, ghost_class};

    ghost_class! {
        struct Account {
            id: u64,
            lazy balance: i64,
        }
    }

    #[test]
    fn field_lookup_reports_index() {
        let def = Account::SHAPE.class_def().unwrap();
        let (index, field) = def.field("balance").unwrap();
        assert_eq!(index, 1);
        assert_eq!(field.name, "balance");
        assert!(def.field("missing").is_none());
    }

    #[test]
    fn tag_queries_fail_on_unknown_property() {
        let def = Account::SHAPE.class_def().unwrap();
        assert_eq!(def.has_attr_on("balance", &FieldAttribute::LAZY), Ok(true));
        assert_eq!(def.has_attr_on("id", &FieldAttribute::LAZY), Ok(false));
        assert_eq!(
            def.has_attr_on("missing", &FieldAttribute::LAZY),
            Err(FieldError::NoSuchField)
        );
        assert_eq!(
            def.properties_have_attr(&["balance"], &FieldAttribute::LAZY),
            Ok(true)
        );
        assert_eq!(
            def.properties_have_attr(&["balance", "id"], &FieldAttribute::LAZY),
            Ok(false)
        );
        assert_eq!(
            def.properties_have_attr(&["balance", "missing"], &FieldAttribute::LAZY),
            Err(FieldError::NoSuchField)
        );
    }

    #[test]
    fn constructor_membership() {
        let def = Account::SHAPE.class_def().unwrap();
        assert!(def.is_constructor_parameter("id"));
        assert!(def.is_constructor_parameter("balance"));
        assert!(!def.is_constructor_parameter("missing"));
    }
}
