//! The deferred-initialization proxy primitive.
//!
//! A [`Ghost<T>`] owns storage for a `T` whose fields are written in two
//! waves: eager properties (and defaults) directly at build time, everything
//! else by a one-shot initializer that runs on the first read of any pending
//! property. The ghost keeps a per-field bitmap of what has been written,
//! drops exactly what was written, and guarantees the initializer fires at
//! most once through a small state machine — there is no locking; a ghost is
//! a single-threaded value (`!Sync` by construction).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::{Cell, RefCell, UnsafeCell};
use core::fmt;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use lazyghost_core::{AnyValue, ClassDef, Field, GhostClass, PtrConst, PtrUninit, Shape};

use crate::error::GhostError;
use crate::trace;

mod fieldset;
use fieldset::FieldSet;

/// Lifecycle of a ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GhostState {
    /// The deferred initializer has not run yet.
    Pending,

    /// The deferred initializer is running right now.
    Running,

    /// Fully initialized; all reads short-circuit to storage.
    Ready,

    /// The initializer ran and failed. Pending properties are lost; eager
    /// ones remain readable.
    Poisoned,

    /// `into_inner` moved the value out; the storage must not be touched
    /// again.
    Moved,
}

/// The one-shot callback bound to a ghost at creation.
pub(crate) type Initializer<T> = Box<dyn FnOnce(&Ghost<T>) -> Result<(), GhostError>>;

/// An instance of `T` whose lazy properties are filled on first touch.
///
/// Created by [`GhostBuilder::build`](crate::GhostBuilder::build). Reading
/// an eager property never triggers initialization; reading any deferred
/// property runs the bound initializer exactly once, after which the ghost
/// is permanently initialized and [`is_uninitialized`](Ghost::is_uninitialized)
/// reports `false`.
pub struct Ghost<T: GhostClass> {
    shape: &'static Shape,
    class: &'static ClassDef,
    storage: UnsafeCell<MaybeUninit<T>>,
    written: RefCell<FieldSet>,
    state: Cell<GhostState>,
    initializer: Cell<Option<Initializer<T>>>,
}

impl<T: GhostClass> Ghost<T> {
    /// Creates a ghost bound to `initializer`, with default-valued
    /// non-constructor fields already written.
    pub(crate) fn deferred(
        shape: &'static Shape,
        class: &'static ClassDef,
        initializer: Initializer<T>,
    ) -> Self {
        let ghost = Self {
            shape,
            class,
            storage: UnsafeCell::new(MaybeUninit::uninit()),
            written: RefCell::new(FieldSet::new(class.fields.len())),
            state: Cell::new(GhostState::Pending),
            initializer: Cell::new(Some(initializer)),
        };
        for (index, field) in class.fields.iter().enumerate() {
            if let Some(default_in_place) = field.vtable.default_in_place
                && !class.is_constructor_parameter(field.name)
            {
                // SAFETY: the offset addresses an uninitialized field of our
                // own storage, and the vtable was built for the field's type.
                unsafe {
                    default_in_place(ghost.base_uninit().field_uninit_at(field.offset));
                }
                ghost.written.borrow_mut().set(index);
            }
        }
        ghost
    }

    /// The shape of the class this ghost instantiates.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// Reports whether the deferred initializer has fired yet.
    ///
    /// Stays `true` across eager-property reads, flips to `false` on the
    /// first read of a deferred property, and stays `true` forever if the
    /// initializer failed.
    #[inline]
    pub fn is_uninitialized(&self) -> bool {
        self.state.get() != GhostState::Ready
    }

    /// Reads a property, triggering initialization if it is still pending.
    ///
    /// Fails with `UnknownProperty` for names the class does not have, with
    /// `TypeMismatch` when `F` is not the field's declared type, and with
    /// whatever the deferred initializer fails with if this read triggers it.
    pub fn get<F: Any>(&self, property: &str) -> Result<&F, GhostError> {
        let (index, field) = self.lookup(property)?;
        self.ensure(index, field)?;
        // SAFETY: `ensure` verified the field is initialized; initialized
        // fields are never written again, so the borrow stays valid for as
        // long as `&self`.
        let any = unsafe { (field.vtable.borrow)(self.base_const().field(field.offset)) };
        any.downcast_ref::<F>().ok_or(GhostError::TypeMismatch {
            property: field.name,
            expected: field.type_name(),
            actual: core::any::type_name::<F>(),
        })
    }

    /// Reads a property as `&dyn Any`, triggering initialization if it is
    /// still pending.
    pub fn get_dyn(&self, property: &str) -> Result<&dyn Any, GhostError> {
        let (index, field) = self.lookup(property)?;
        self.ensure(index, field)?;
        // SAFETY: as in `get`.
        Ok(unsafe { (field.vtable.borrow)(self.base_const().field(field.offset)) })
    }

    /// Forces initialization and returns the materialized `T`.
    pub fn into_inner(self) -> Result<T, GhostError> {
        if self.state.get() == GhostState::Pending {
            self.trigger()?;
        }
        if self.state.get() != GhostState::Ready {
            return Err(GhostError::Poisoned {
                class: self.shape.type_name,
            });
        }
        self.state.set(GhostState::Moved);
        // SAFETY: the storage was fully initialized (we just saw Ready), and
        // the Moved state keeps our Drop impl away from it.
        Ok(unsafe { self.storage.get().read().assume_init() })
    }

    /// Writes a property without triggering the deferred initializer.
    ///
    /// Used by the builder for eager properties and by the compiled
    /// initializer for resolved deferred ones. Writing an already-written
    /// field is an invariant violation.
    pub(crate) fn raw_set(&self, index: usize, value: AnyValue) -> Result<(), GhostError> {
        let field = &self.class.fields[index];
        if self.written.borrow().get(index) {
            return Err(GhostError::InvariantViolation);
        }
        // SAFETY: the offset addresses an unwritten field of our own storage,
        // and the vtable downcast-checks the value before writing.
        unsafe { (field.vtable.write)(self.base_uninit().field_uninit_at(field.offset), value) }
            .map_err(|source| GhostError::IncompatibleLazyValue {
                property: field.name,
                source,
            })?;
        self.written.borrow_mut().set(index);
        trace!(
            class = self.shape.type_name,
            property = field.name,
            "raw write"
        );
        Ok(())
    }

    fn lookup(&self, property: &str) -> Result<(usize, &'static Field), GhostError> {
        self.class
            .field(property)
            .ok_or_else(|| GhostError::UnknownProperty {
                class: self.shape.type_name,
                property: property.into(),
            })
    }

    /// Makes sure the field at `index` is initialized, running the deferred
    /// initializer if this is the first touch of a pending property.
    fn ensure(&self, index: usize, field: &'static Field) -> Result<(), GhostError> {
        if self.written.borrow().get(index) {
            return Ok(());
        }
        match self.state.get() {
            GhostState::Pending => {
                self.trigger()?;
                if self.written.borrow().get(index) {
                    Ok(())
                } else {
                    Err(GhostError::MissingConstructionArgument {
                        class: self.shape.type_name,
                        parameter: field.name,
                    })
                }
            }
            GhostState::Running => Err(GhostError::RecursiveInitialization {
                class: self.shape.type_name,
            }),
            GhostState::Poisoned => Err(GhostError::Poisoned {
                class: self.shape.type_name,
            }),
            // Ready with an unwritten field cannot happen: Ready is only
            // entered once every field is written.
            GhostState::Ready => Err(GhostError::InvariantViolation),
            // Moved is unreachable here: `into_inner` consumes the ghost, so
            // no field read can observe a moved-out value.
            GhostState::Moved => Err(GhostError::InvariantViolation),
        }
    }

    /// Runs the one-shot initializer. At most one call can ever reach the
    /// body: the callback is taken out of its cell first, and the state
    /// machine diverts later (and re-entrant) callers.
    fn trigger(&self) -> Result<(), GhostError> {
        let Some(initializer) = self.initializer.take() else {
            return Err(GhostError::InvariantViolation);
        };
        trace!(
            class = self.shape.type_name,
            "first touch, running deferred initializer"
        );
        self.state.set(GhostState::Running);
        if let Err(error) = initializer(self) {
            self.state.set(GhostState::Poisoned);
            return Err(error);
        }
        if let Some(unset) = self.first_unwritten() {
            self.state.set(GhostState::Poisoned);
            return Err(GhostError::MissingConstructionArgument {
                class: self.shape.type_name,
                parameter: unset.name,
            });
        }
        self.state.set(GhostState::Ready);
        Ok(())
    }

    fn first_unwritten(&self) -> Option<&'static Field> {
        let written = self.written.borrow();
        self.class
            .fields
            .iter()
            .enumerate()
            .find(|&(index, _)| !written.get(index))
            .map(|(_, field)| field)
    }

    fn base_uninit(&self) -> PtrUninit<'_> {
        // UnsafeCell::get never returns null.
        PtrUninit::new(unsafe { NonNull::new_unchecked(self.storage.get().cast::<u8>()) })
    }

    fn base_const(&self) -> PtrConst<'_> {
        // SAFETY: callers only offset into fields recorded as written.
        unsafe { PtrConst::new(NonNull::new_unchecked(self.storage.get().cast::<u8>())) }
    }
}

impl<T: GhostClass> Drop for Ghost<T> {
    fn drop(&mut self) {
        match self.state.get() {
            GhostState::Ready => {
                // SAFETY: fully initialized; drop as a whole `T` so its own
                // Drop impl (if any) runs.
                unsafe { self.storage.get_mut().assume_init_drop() };
                return;
            }
            GhostState::Moved => return,
            _ => {}
        }
        let written = self.written.get_mut();
        for (index, field) in self.class.fields.iter().enumerate() {
            if written.get(index) {
                // SAFETY: only fields recorded as written are dropped, each
                // exactly once; the vtable was built for the field's type.
                unsafe {
                    let base = PtrUninit::from_maybe_uninit(self.storage.get_mut());
                    (field.vtable.drop_in_place)(base.field_init_at(field.offset));
                }
            }
        }
    }
}

impl<T: GhostClass> fmt::Debug for Ghost<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let written = self.written.borrow();
        let fields: Vec<&str> = self
            .class
            .fields
            .iter()
            .enumerate()
            .filter(|&(index, _)| written.get(index))
            .map(|(_, field)| field.name)
            .collect();
        f.debug_struct("Ghost")
            .field("class", &self.shape.type_name)
            .field("state", &self.state.get())
            .field("written", &fields)
            .finish()
    }
}
