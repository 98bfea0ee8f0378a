//! # Interior Nodes
//!
//! Interior nodes store `(separator, child)` entries that guide descent from
//! the root to a leaf. The separator at position `i` is the *maximum* key in
//! the subtree rooted at child `i` (not the minimum of the subtree to its
//! right), because the bulk loader records each node's largest key as it
//! finishes building it:
//!
//! ```text
//! [Interior: (2, L0) (4, L1) (5, L2)]
//!               |       |       |
//!         [1 2]    [3 4]    [5]
//! ```
//!
//! ## Navigation Semantics
//!
//! For a search key K, descent follows the leftmost separator >= K. If K is
//! greater than every separator, descent falls back to the last child: the
//! node that would contain the nearest existing range. The fallback is
//! load-bearing for the rightmost-leaf path and is specified behavior, not a
//! malformed-tree repair.
//!
//! Like leaves, interior nodes are append-only and filled in ascending
//! separator order by the bulk loader; appending past capacity panics.

use crate::node::NodeId;

#[derive(Debug)]
pub(crate) struct Interior<K> {
    entries: Vec<(K, NodeId)>,
}

impl<K: Ord> Interior<K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends a `(separator, child)` entry. The caller guarantees ascending
    /// separator order.
    pub(crate) fn push(&mut self, separator: K, child: NodeId, capacity: usize) {
        assert!(
            self.entries.len() < capacity,
            "append to a full interior node (capacity {capacity})"
        );
        debug_assert!(
            self.entries.last().map_or(true, |(last, _)| *last <= separator),
            "interior entries appended out of separator order"
        );
        self.entries.push((separator, child));
    }

    /// Child to descend into for `key`: the leftmost separator >= `key`,
    /// falling back to the last child when `key` exceeds every separator.
    pub(crate) fn child_for(&self, key: &K) -> NodeId {
        debug_assert!(!self.entries.is_empty(), "descent through an empty interior node");
        let index = self.entries.partition_point(|(separator, _)| separator < key);
        let index = index.min(self.entries.len() - 1);
        self.entries[index].1
    }

    pub(crate) fn first_child(&self) -> NodeId {
        self.entries.first().expect("first_child of an empty interior node").1
    }

    pub(crate) fn last_child(&self) -> NodeId {
        self.entries.last().expect("last_child of an empty interior node").1
    }

    pub(crate) fn separator_at(&self, index: usize) -> &K {
        &self.entries[index].0
    }

    pub(crate) fn child_at(&self, index: usize) -> NodeId {
        self.entries[index].1
    }

    /// Largest separator, i.e. the largest key reachable through this node.
    pub(crate) fn max_key(&self) -> &K {
        let (separator, _) = self.entries.last().expect("max_key of an empty interior node");
        separator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interior_with(separators: &[u64]) -> Interior<u64> {
        let mut node = Interior::with_capacity(separators.len());
        for (i, &sep) in separators.iter().enumerate() {
            node.push(sep, NodeId::new(i as u32), separators.len());
        }
        node
    }

    #[test]
    fn child_for_below_first_separator() {
        let node = interior_with(&[10, 20, 30]);

        assert_eq!(node.child_for(&5), NodeId::new(0));
    }

    #[test]
    fn child_for_between_separators() {
        let node = interior_with(&[10, 20, 30]);

        assert_eq!(node.child_for(&15), NodeId::new(1));
        assert_eq!(node.child_for(&21), NodeId::new(2));
    }

    #[test]
    fn child_for_exact_match_descends_to_that_child() {
        let node = interior_with(&[10, 20, 30]);

        assert_eq!(node.child_for(&20), NodeId::new(1));
    }

    #[test]
    fn child_for_above_all_separators_falls_back_to_last_child() {
        let node = interior_with(&[10, 20, 30]);

        assert_eq!(node.child_for(&99), NodeId::new(2));
    }

    #[test]
    fn child_for_duplicate_separators_picks_leftmost() {
        let node = interior_with(&[10, 10, 20]);

        assert_eq!(node.child_for(&10), NodeId::new(0));
    }

    #[test]
    fn first_and_last_child() {
        let node = interior_with(&[10, 20, 30]);

        assert_eq!(node.first_child(), NodeId::new(0));
        assert_eq!(node.last_child(), NodeId::new(2));
        assert_eq!(*node.max_key(), 30);
    }

    #[test]
    #[should_panic(expected = "full interior")]
    fn push_past_capacity_panics() {
        let mut node: Interior<u64> = Interior::with_capacity(1);
        node.push(1, NodeId::new(0), 1);
        node.push(2, NodeId::new(1), 1);
    }
}
