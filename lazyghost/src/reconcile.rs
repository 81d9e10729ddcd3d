//! The reconciliation engine.
//!
//! Verifies that the union of eager, individually-lazy and group-lazy
//! property names exactly equals, with no duplicates, a class's required
//! constructor parameters. The check works purely on counts and sorted
//! comparisons: a true disjoint union preserves cardinality under merge, so
//! any overlap, excess or shortfall shows up as a count mismatch along the
//! way.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::group::LazyGroup;
use crate::trace;

/// Returns true when `eager + lazy + groups` exactly covers `required`.
pub(crate) fn reconcile(
    required: &[&str],
    eager: &[&str],
    lazy: &[&str],
    groups: &[LazyGroup],
) -> bool {
    // Group membership flattened as a list, not a set: a name claimed by two
    // groups must inflate the count below.
    let flattened: Vec<&str> = groups
        .iter()
        .flat_map(|group| group.properties.iter().map(|name| name.as_str()))
        .collect();

    let separated = eager.len() + lazy.len() + flattened.len();
    if separated != required.len() {
        trace!(
            separated,
            required = required.len(),
            "reconciliation failed: declared count differs from parameter count"
        );
        return false;
    }

    // A disjoint union keeps its cardinality when merged; a shrink here means
    // some name was declared in more than one source.
    let merged: BTreeSet<&str> = eager
        .iter()
        .chain(lazy.iter())
        .chain(flattened.iter())
        .copied()
        .collect();
    if merged.len() != separated {
        trace!("reconciliation failed: a property was declared in more than one source");
        return false;
    }

    let required_set: BTreeSet<&str> = required.iter().copied().collect();
    let intersection: Vec<&str> = merged.intersection(&required_set).copied().collect();
    if intersection.len() != required.len() {
        trace!("reconciliation failed: a declared property is not a constructor parameter");
        return false;
    }

    // Element-wise comparison of the sorted sequences catches equal-sized but
    // differing name sets.
    let mut required_sorted: Vec<&str> = required.to_vec();
    required_sorted.sort_unstable();
    intersection == required_sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupProducer;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    fn group(names: &[&str]) -> LazyGroup {
        let producer: GroupProducer = Rc::new(Vec::new);
        LazyGroup::new(names.iter().map(|&n| String::from(n)).collect(), producer)
    }

    #[test]
    fn exact_cover_passes() {
        assert!(reconcile(&["a", "b", "c"], &["a"], &["b"], &[group(&["c"])]));
    }

    #[test]
    fn order_does_not_matter() {
        assert!(reconcile(&["c", "a", "b"], &["b", "a"], &["c"], &[]));
    }

    #[test]
    fn missing_parameter_fails() {
        assert!(!reconcile(&["a", "b"], &["a"], &[], &[]));
    }

    #[test]
    fn excess_declaration_fails() {
        assert!(!reconcile(&["a"], &["a"], &["b"], &[]));
    }

    #[test]
    fn duplicate_across_sources_fails() {
        // "a" both eager and lazy: counts match but the merge shrinks.
        assert!(!reconcile(&["a", "b"], &["a"], &["a"], &[]));
    }

    #[test]
    fn duplicate_across_groups_fails() {
        assert!(!reconcile(&["a", "b"], &[], &[], &[group(&["a", "b"]), group(&["a"])]));
    }

    #[test]
    fn foreign_name_fails() {
        // Same cardinality, wrong element.
        assert!(!reconcile(&["a", "b"], &["a"], &["z"], &[]));
    }

    #[test]
    fn group_only_cover_passes() {
        assert!(reconcile(&["a", "b"], &[], &[], &[group(&["b", "a"])]));
    }

    #[test]
    fn empty_constructor_requires_empty_declarations() {
        assert!(reconcile(&[], &[], &[], &[]));
        assert!(!reconcile(&[], &["a"], &[], &[]));
    }
}
