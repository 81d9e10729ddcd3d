//! Build-time behavior: classification, reconciliation, fail-fast checks.

use lazyghost::{
    ClassDefBuilder, FieldAttribute, GhostClass, GhostError, ObjectFactory, Shape, ShapeBuilder,
    Ty, field_of, ghost_class,
};

ghost_class! {
    #[derive(Debug)]
    pub struct Order {
        id: u64,
        total: i64,
        lazy line_items: Vec<u32>,
    }
}

ghost_class! {
    #[derive(Debug)]
    pub struct Profile {
        name: String,
        lazy bio: String,
        lazy avatar_url: String,
    }
}

#[test]
fn build_succeeds_when_names_cover_the_constructor() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    let order = ObjectFactory::new()
        .ghost::<Order>()?
        .property("id", 7u64)
        .property("total", 1999i64)
        .lazy_property("line_items", || vec![1u32, 2, 3])?
        .build()?;

    assert!(order.is_uninitialized());
    Ok(())
}

#[test]
fn missing_parameter_is_incomplete() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    // `name` is unaccounted for: neither eager nor covered by the group.
    let err = ObjectFactory::new()
        .ghost::<Profile>()?
        .lazy_group_properties(&["bio", "avatar_url"], || {
            vec![
                lazyghost::Property::new("bio", String::from("x")),
                lazyghost::Property::new("avatar_url", String::from("y")),
            ]
        })?
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        GhostError::IncompleteConstructionArguments { class: "Profile" }
    ));
    Ok(())
}

#[test]
fn duplicate_across_sources_is_incomplete() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    let err = ObjectFactory::new()
        .ghost::<Order>()?
        .property("id", 7u64)
        .property("total", 1999i64)
        .property("line_items", vec![9u32])
        .lazy_property("line_items", || vec![1u32, 2, 3])?
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        GhostError::IncompleteConstructionArguments { .. }
    ));
    Ok(())
}

#[test]
fn excess_declaration_is_incomplete() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    // Unknown eager name: counts disagree with the constructor.
    let err = ObjectFactory::new()
        .ghost::<Order>()?
        .property("id", 7u64)
        .property("total", 1999i64)
        .property("discount", 1u8)
        .lazy_property("line_items", || vec![1u32])?
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        GhostError::IncompleteConstructionArguments { .. }
    ));
    Ok(())
}

#[test]
fn not_marked_lazy_fails_at_declaration_time() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    // `total` carries no lazy marker; the builder refuses before build().
    let err = ObjectFactory::new()
        .ghost::<Order>()?
        .lazy_property("total", || 0i64)
        .unwrap_err();

    assert!(matches!(err, GhostError::NotMarkedLazy { class: "Order", .. }));
    Ok(())
}

#[test]
fn unknown_property_fails_at_declaration_time() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    let err = ObjectFactory::new()
        .ghost::<Order>()?
        .lazy_property("lineitems", || vec![1u32])
        .unwrap_err();

    assert!(matches!(err, GhostError::UnknownProperty { .. }));
    Ok(())
}

#[test]
fn empty_group_is_rejected() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    let err = ObjectFactory::new()
        .ghost::<Profile>()?
        .lazy_group_properties(&[], Vec::new)
        .unwrap_err();

    assert!(matches!(err, GhostError::EmptyLazyGroup { .. }));
    Ok(())
}

#[test]
fn eager_value_of_wrong_type_fails_at_build_time() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    let err = ObjectFactory::new()
        .ghost::<Order>()?
        .property("id", "seven")
        .property("total", 1999i64)
        .lazy_property("line_items", || vec![1u32])?
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        GhostError::IncompatibleLazyValue { property: "id", .. }
    ));
    Ok(())
}

struct Opaque;

// SAFETY: an opaque shape declares no fields to get wrong.
unsafe impl GhostClass for Opaque {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::new().type_name("Opaque").ty(Ty::Opaque).build()
    };
}

#[test]
fn factory_rejects_non_classes() {
    lazyghost_testhelpers::setup();

    let err = ObjectFactory::new().ghost::<Opaque>().unwrap_err();
    assert!(matches!(err, GhostError::NotAClass { type_name: "Opaque" }));
}

struct Sealed {
    x: u32,
}

// SAFETY: the one declared field matches the struct; the shape deliberately
// declares no constructor.
unsafe impl GhostClass for Sealed {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::new()
            .type_name("Sealed")
            .ty(Ty::Class(
                ClassDefBuilder::new()
                    .fields(&const { [field_of!(Sealed, x: u32)] })
                    .build(),
            ))
            .build()
    };
}

#[test]
fn class_without_constructor_is_not_constructible() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    let err = ObjectFactory::new().ghost::<Sealed>()?.build().unwrap_err();
    assert!(matches!(err, GhostError::NotConstructible { class: "Sealed" }));
    Ok(())
}

struct Report {
    pub title: String,
    pub body: String,
}

// SAFETY: names, offsets and vtables below match the struct.
unsafe impl GhostClass for Report {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::new()
            .type_name("Report")
            .ty(Ty::Class(
                ClassDefBuilder::new()
                    .fields(&const {
                        [
                            field_of!(Report, title: String),
                            field_of!(Report, body: String, &const { [FieldAttribute::new("orm", "lazy")] }),
                        ]
                    })
                    .constructor(&["title", "body"])
                    .build(),
            ))
            .build()
    };
}

#[test]
fn custom_lazy_tag_gates_lazy_declarations() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    // Under the builtin tag, `body` is not marked lazy.
    let err = ObjectFactory::new()
        .ghost::<Report>()?
        .lazy_property("body", || String::from("text"))
        .unwrap_err();
    assert!(matches!(err, GhostError::NotMarkedLazy { .. }));

    // Under the orm tag it is.
    let report = ObjectFactory::new()
        .ghost::<Report>()?
        .lazy_tag(FieldAttribute::new("orm", "lazy"))
        .property("title", String::from("Q3"))
        .lazy_property("body", || String::from("text"))?
        .build()?;
    assert_eq!(report.get::<String>("body")?, "text");
    Ok(())
}

ghost_class! {
    #[derive(Debug)]
    pub struct Job {
        name: String,
        lazy payload: Vec<u8>,
        default retries: u32,
    }
}

#[test]
fn default_fields_are_not_constructor_parameters() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    let job = ObjectFactory::new()
        .ghost::<Job>()?
        .property("name", String::from("reindex"))
        .lazy_property("payload", || vec![1u8, 2])?
        .build()?;

    // The default is written at creation; reading it triggers nothing.
    assert!(job.is_uninitialized());
    assert_eq!(job.get::<u32>("retries")?, &0);
    assert!(job.is_uninitialized());
    Ok(())
}

#[test]
fn building_twice_yields_independent_ghosts() -> Result<(), GhostError> {
    lazyghost_testhelpers::setup();

    use std::cell::Cell;
    use std::rc::Rc;

    let calls = Rc::new(Cell::new(0u32));
    let counter = calls.clone();
    let builder = ObjectFactory::new()
        .ghost::<Order>()?
        .property("id", 7u64)
        .property("total", 1999i64)
        .lazy_property("line_items", move || {
            counter.set(counter.get() + 1);
            vec![counter.get()]
        })?;

    let first = builder.build()?;
    let second = builder.build()?;

    assert_eq!(first.get::<Vec<u32>>("line_items")?, &[1]);
    assert!(second.is_uninitialized());
    assert_eq!(second.get::<Vec<u32>>("line_items")?, &[2]);
    assert_eq!(calls.get(), 2);
    Ok(())
}
