//! The object factory.

use lazyghost_core::GhostClass;

use crate::builder::GhostBuilder;
use crate::error::GhostError;

/// Hands out ghost builders for constructible classes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectFactory;

impl ObjectFactory {
    /// Creates a new factory.
    pub const fn new() -> Self {
        Self
    }

    /// Starts building a lazy ghost of `T`.
    ///
    /// Fails with `NotAClass` when `T`'s shape does not describe a
    /// constructible class.
    pub fn ghost<T: GhostClass>(&self) -> Result<GhostBuilder<T>, GhostError> {
        GhostBuilder::new()
    }
}
