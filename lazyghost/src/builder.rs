//! The fluent ghost builder.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use lazyghost_core::{AnyValue, ClassDef, Field, FieldAttribute, GhostClass, Shape};

use crate::classify;
use crate::error::GhostError;
use crate::ghost::Ghost;
use crate::group::{LazyGroup, Property};
use crate::initializer::{self, LazyProducer};
use crate::reconcile;
use crate::trace;

/// Eager values are stored clone-on-build, so one builder can produce any
/// number of independent ghosts.
trait CloneableValue {
    fn to_value(&self) -> AnyValue;
}

impl<V: Any + Clone> CloneableValue for V {
    fn to_value(&self) -> AnyValue {
        AnyValue::new(self.clone())
    }
}

/// Accumulates eager values, per-property lazy producers and lazy groups for
/// a class `T`, then builds [`Ghost<T>`] instances from them.
///
/// Obtained from [`ObjectFactory::ghost`](crate::ObjectFactory::ghost). The
/// setters chain by value; `lazy_property` and `lazy_group_properties`
/// verify the lazy marker immediately and fail fast, everything else is
/// validated by [`build`](GhostBuilder::build) before any object exists.
///
/// A builder is a single-writer value: it is not meant to be shared, and
/// [`build`](GhostBuilder::build) re-validates from scratch on every call.
pub struct GhostBuilder<T: GhostClass> {
    shape: &'static Shape,
    class: &'static ClassDef,
    lazy_tag: FieldAttribute,
    eager: BTreeMap<String, Box<dyn CloneableValue>>,
    lazy: BTreeMap<String, LazyProducer>,
    groups: Vec<LazyGroup>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: GhostClass> GhostBuilder<T> {
    /// Creates a builder for `T`.
    ///
    /// Fails with `NotAClass` when `T`'s shape does not describe a class.
    pub fn new() -> Result<Self, GhostError> {
        let shape = T::SHAPE;
        let class = shape.class_def().ok_or(GhostError::NotAClass {
            type_name: shape.type_name,
        })?;
        Ok(Self {
            shape,
            class,
            lazy_tag: FieldAttribute::LAZY,
            eager: BTreeMap::new(),
            lazy: BTreeMap::new(),
            groups: Vec::new(),
            _marker: PhantomData,
        })
    }

    /// Uses `tag` instead of [`FieldAttribute::LAZY`] as the marker that
    /// permits lazy declarations on this builder.
    pub fn lazy_tag(mut self, tag: FieldAttribute) -> Self {
        self.lazy_tag = tag;
        self
    }

    /// Supplies an eager value for a property.
    ///
    /// The value is written directly at build time, without marking the
    /// property lazy in any way; reading it never triggers initialization.
    /// Declaring the same property twice keeps the latest value.
    pub fn property<V: Any + Clone>(mut self, property: &str, value: V) -> Self {
        self.eager.insert(property.into(), Box::new(value));
        self
    }

    /// Registers a producer for one individually-lazy property.
    ///
    /// Fails immediately with `NotMarkedLazy` when the class does not tag
    /// the property with the configured lazy marker, or `UnknownProperty`
    /// when no such property exists.
    pub fn lazy_property<V, F>(mut self, property: &str, producer: F) -> Result<Self, GhostError>
    where
        V: Any,
        F: Fn() -> V + 'static,
    {
        self.check_marked_lazy(&[property])?;
        self.lazy
            .insert(property.into(), Rc::new(move || AnyValue::new(producer())));
        Ok(self)
    }

    /// Registers a group of properties resolved together by one producer.
    ///
    /// The producer must return a value for every declared property, and
    /// nothing else; it is invoked at most once per built ghost, when the
    /// first member is touched. Fails like
    /// [`lazy_property`](GhostBuilder::lazy_property), and with
    /// `EmptyLazyGroup` when `properties` is empty.
    pub fn lazy_group_properties<F>(
        mut self,
        properties: &[&str],
        producer: F,
    ) -> Result<Self, GhostError>
    where
        F: Fn() -> Vec<Property> + 'static,
    {
        if properties.is_empty() {
            return Err(GhostError::EmptyLazyGroup {
                class: self.shape.type_name,
            });
        }
        self.check_marked_lazy(properties)?;
        self.groups.push(LazyGroup::new(
            properties.iter().map(|&name| name.into()).collect(),
            Rc::new(producer),
        ));
        Ok(self)
    }

    /// Builds a ghost: classifies the constructor parameters, reconciles
    /// them against the declared properties, compiles the deferred
    /// initializer, creates the ghost bound to it, and writes the eager
    /// properties.
    ///
    /// Either returns a fully valid deferred object or fails before any
    /// object is created — except `IncompatibleLazyValue`, which can also
    /// arise here from an eager value of the wrong type.
    pub fn build(&self) -> Result<Ghost<T>, GhostError> {
        let classified = classify::constructor_parameters(self.shape)?;
        let required = classified.names();
        let eager_names: Vec<&str> = self.eager.keys().map(String::as_str).collect();
        let lazy_names: Vec<&str> = self.lazy.keys().map(String::as_str).collect();

        let (_tagged, _untagged) = classified.split_by_tag(&self.lazy_tag);
        trace!(
            class = self.shape.type_name,
            required = required.len(),
            lazy_capable = _tagged.len(),
            eager_only = _untagged.len(),
            groups = self.groups.len(),
            "building ghost"
        );

        if !reconcile::reconcile(&required, &eager_names, &lazy_names, &self.groups) {
            return Err(GhostError::IncompleteConstructionArguments {
                class: self.shape.type_name,
            });
        }

        let deferred: Vec<(usize, &'static Field)> = classified
            .parameters
            .iter()
            .copied()
            .filter(|(_, field)| !self.eager.contains_key(field.name))
            .collect();

        let initializer = initializer::compile::<T>(deferred, self.lazy.clone(), self.groups.clone());
        let ghost = Ghost::deferred(self.shape, self.class, Box::new(initializer));

        for (property, value) in &self.eager {
            // Reconciliation proved every eager name is a constructor
            // parameter, hence a field.
            let Some((index, _)) = self.class.field(property) else {
                return Err(GhostError::InvariantViolation);
            };
            ghost.raw_set(index, CloneableValue::to_value(&**value))?;
        }

        Ok(ghost)
    }

    fn check_marked_lazy(&self, properties: &[&str]) -> Result<(), GhostError> {
        for &property in properties {
            match self.class.has_attr_on(property, &self.lazy_tag) {
                Ok(true) => {}
                Ok(false) => {
                    return Err(GhostError::NotMarkedLazy {
                        class: self.shape.type_name,
                        property: property.into(),
                    });
                }
                Err(_) => {
                    return Err(GhostError::UnknownProperty {
                        class: self.shape.type_name,
                        property: property.into(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<T: GhostClass> fmt::Debug for GhostBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhostBuilder")
            .field("class", &self.shape.type_name)
            .field("eager", &self.eager.keys().collect::<Vec<_>>())
            .field("lazy", &self.lazy.keys().collect::<Vec<_>>())
            .field("groups", &self.groups)
            .finish()
    }
}
