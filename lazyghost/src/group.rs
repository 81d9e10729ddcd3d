//! Lazy groups and the property descriptor DTO.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use lazyghost_core::AnyValue;

/// A resolved name/value pair, as reported by a group producer.
pub struct Property {
    name: String,
    value: AnyValue,
}

impl Property {
    /// Creates a new property descriptor.
    pub fn new<V: Any>(name: impl Into<String>, value: V) -> Self {
        Self {
            name: name.into(),
            value: AnyValue::new(value),
        }
    }

    /// The property name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (String, AnyValue) {
        (self.name, self.value)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({}: {})", self.name, self.value.type_name())
    }
}

/// Identity of a lazy group, unique for the lifetime of the process.
///
/// Allocated from a monotonic counter: group identities must never collide,
/// otherwise the initializer's already-processed check would suppress a
/// legitimately distinct group.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct GroupId(u64);

impl GroupId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

pub(crate) type GroupProducer = Rc<dyn Fn() -> Vec<Property>>;

/// A set of property names resolved together by a single producer.
#[derive(Clone)]
pub(crate) struct LazyGroup {
    pub(crate) id: GroupId,
    pub(crate) properties: Vec<String>,
    pub(crate) producer: GroupProducer,
}

impl LazyGroup {
    pub(crate) fn new(properties: Vec<String>, producer: GroupProducer) -> Self {
        Self {
            id: GroupId::next(),
            properties,
            producer,
        }
    }

    pub(crate) fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|name| name == property)
    }
}

impl fmt::Debug for LazyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyGroup")
            .field("id", &self.id)
            .field("properties", &self.properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn group_ids_are_unique() {
        let producer: GroupProducer = Rc::new(Vec::new);
        let a = LazyGroup::new(vec!["x".into()], producer.clone());
        let b = LazyGroup::new(vec!["x".into()], producer);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn membership() {
        let group = LazyGroup::new(vec!["bio".into(), "avatar".into()], Rc::new(Vec::new));
        assert!(group.has_property("bio"));
        assert!(!group.has_property("name"));
    }
}
