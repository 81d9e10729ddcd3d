//! Macros for declaring ghost classes.
//!
//! [`ghost_class!`] is the declarative front door: it defines a struct and
//! implements [`GhostClass`](crate::GhostClass) for it in one go, deriving
//! the shape (fields, offsets, constructor parameter list) from the field
//! list. [`field_of!`] is the lower-level building block for hand-written
//! shapes.

/// Builds a [`Field`](crate::Field) descriptor for a named field of a type.
///
/// # Example
///
/// ```ignore
/// const FIELDS: &[Field] = &[
///     field_of!(Order, id: u64),
///     field_of!(Order, line_items: Vec<u32>, &[FieldAttribute::LAZY]),
/// ];
/// ```
#[macro_export]
macro_rules! field_of {
    ($container:ty, $field:ident : $ty:ty) => {
        $crate::Field::builder()
            .name(stringify!($field))
            .offset(::core::mem::offset_of!($container, $field))
            .vtable($crate::FieldVTable::of::<$ty>())
            .build()
    };
    ($container:ty, $field:ident : $ty:ty, $attributes:expr) => {
        $crate::Field::builder()
            .name(stringify!($field))
            .offset(::core::mem::offset_of!($container, $field))
            .attributes($attributes)
            .vtable($crate::FieldVTable::of::<$ty>())
            .build()
    };
}

/// Defines a struct and implements [`GhostClass`](crate::GhostClass) for it.
///
/// Fields may be prefixed with `lazy` (marks the field with
/// [`FieldAttribute::LAZY`](crate::FieldAttribute::LAZY)) or `default`
/// (excludes the field from the constructor parameter list and fills it from
/// `Default::default()` when a ghost is created). Plain and `lazy` fields
/// become constructor parameters, in declaration order.
///
/// # Example
///
/// ```
/// use lazyghost_core::ghost_class;
///
/// ghost_class! {
///     #[derive(Debug)]
///     pub struct Order {
///         id: u64,
///         total: i64,
///         lazy line_items: Vec<u32>,
///         default note: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! ghost_class {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::ghost_class!(@munch
            [$(#[$meta])*] [$vis] $name
            fields [] ctor []
            rest [$($body)*]
        );
    };

    // lazy field
    (@munch $meta:tt $vis:tt $name:ident
        fields [$($f:tt)*] ctor [$($c:ident)*]
        rest [lazy $fname:ident : $fty:ty , $($rest:tt)*]
    ) => {
        $crate::ghost_class!(@munch $meta $vis $name
            fields [$($f)* (lazy $fname : $fty)] ctor [$($c)* $fname]
            rest [$($rest)*]
        );
    };
    (@munch $meta:tt $vis:tt $name:ident
        fields [$($f:tt)*] ctor [$($c:ident)*]
        rest [lazy $fname:ident : $fty:ty]
    ) => {
        $crate::ghost_class!(@munch $meta $vis $name
            fields [$($f)* (lazy $fname : $fty)] ctor [$($c)* $fname]
            rest []
        );
    };

    // default-valued field (not a constructor parameter)
    (@munch $meta:tt $vis:tt $name:ident
        fields [$($f:tt)*] ctor [$($c:ident)*]
        rest [default $fname:ident : $fty:ty , $($rest:tt)*]
    ) => {
        $crate::ghost_class!(@munch $meta $vis $name
            fields [$($f)* (default $fname : $fty)] ctor [$($c)*]
            rest [$($rest)*]
        );
    };
    (@munch $meta:tt $vis:tt $name:ident
        fields [$($f:tt)*] ctor [$($c:ident)*]
        rest [default $fname:ident : $fty:ty]
    ) => {
        $crate::ghost_class!(@munch $meta $vis $name
            fields [$($f)* (default $fname : $fty)] ctor [$($c)*]
            rest []
        );
    };

    // plain (eager-capable) field
    (@munch $meta:tt $vis:tt $name:ident
        fields [$($f:tt)*] ctor [$($c:ident)*]
        rest [$fname:ident : $fty:ty , $($rest:tt)*]
    ) => {
        $crate::ghost_class!(@munch $meta $vis $name
            fields [$($f)* (plain $fname : $fty)] ctor [$($c)* $fname]
            rest [$($rest)*]
        );
    };
    (@munch $meta:tt $vis:tt $name:ident
        fields [$($f:tt)*] ctor [$($c:ident)*]
        rest [$fname:ident : $fty:ty]
    ) => {
        $crate::ghost_class!(@munch $meta $vis $name
            fields [$($f)* (plain $fname : $fty)] ctor [$($c)* $fname]
            rest []
        );
    };

    // all fields munched: emit the struct and the GhostClass impl
    (@munch [$(#[$meta:meta])*] [$vis:vis] $name:ident
        fields [$(($kind:ident $fname:ident : $fty:ty))*] ctor [$($cname:ident)*]
        rest []
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(pub $fname: $fty,)*
        }

        // SAFETY: the shape below is generated from the struct definition
        // itself; names, offsets and vtables all describe `$name` accurately.
        unsafe impl $crate::GhostClass for $name {
            const SHAPE: &'static $crate::Shape = &const {
                $crate::Shape::builder()
                    .type_name(stringify!($name))
                    .ty($crate::Ty::Class(
                        $crate::ClassDef::builder()
                            .fields(&const {
                                [$($crate::ghost_class!(@field $name $kind $fname : $fty),)*]
                            })
                            .constructor(&[$(stringify!($cname)),*])
                            .build(),
                    ))
                    .build()
            };
        }
    };

    // field descriptor for each marker kind
    (@field $name:ident plain $fname:ident : $fty:ty) => {
        $crate::field_of!($name, $fname : $fty)
    };
    (@field $name:ident lazy $fname:ident : $fty:ty) => {
        $crate::field_of!($name, $fname : $fty, &[$crate::FieldAttribute::LAZY])
    };
    (@field $name:ident default $fname:ident : $fty:ty) => {
        $crate::Field::builder()
            .name(stringify!($fname))
            .offset(::core::mem::offset_of!($name, $fname))
            .vtable($crate::FieldVTable::of_with_default::<$fty>())
            .build()
    };
}

#[cfg(test)]
mod tests {
    use crate::{FieldAttribute, GhostClass};

    crate::ghost_class! {
        #[derive(Debug)]
        pub struct Invoice {
            number: u32,
            lazy lines: u64,
            default memo: u8,
        }
    }

    #[test]
    fn shape_reflects_markers() {
        let shape = Invoice::SHAPE;
        assert_eq!(shape.type_name, "Invoice");
        let def = shape.class_def().unwrap();
        assert_eq!(def.fields.len(), 3);
        assert_eq!(def.constructor, Some(&["number", "lines"][..]));

        let (_, number) = def.field("number").unwrap();
        assert!(!number.is_marked(&FieldAttribute::LAZY));
        assert!(!number.has_default());

        let (_, lines) = def.field("lines").unwrap();
        assert!(lines.is_marked(&FieldAttribute::LAZY));

        let (_, memo) = def.field("memo").unwrap();
        assert!(memo.has_default());
        assert!(!def.is_constructor_parameter("memo"));
    }

    #[test]
    fn offsets_match_the_struct() {
        let def = Invoice::SHAPE.class_def().unwrap();
        let (_, number) = def.field("number").unwrap();
        assert_eq!(number.offset, core::mem::offset_of!(Invoice, number));
        assert_eq!(number.type_name(), "u32");
    }
}
