//! # Leaf Nodes
//!
//! Leaf nodes store the actual key-value pairs, in ascending key order, and
//! are linked into a singly-linked chain so that ordered scans never touch
//! interior nodes:
//!
//! ```text
//! [Leaf: (1,a) (2,b)] --next--> [Leaf: (3,c) (4,d)] --next--> [Leaf: (5,e)]
//! ```
//!
//! A leaf is append-only: the bulk loader fills it front to back with
//! already-sorted entries, then never touches it again. The chain link is
//! set exactly once, while the loader builds the successor leaf. The link is
//! a plain arena index, never an owning reference; the tree's node arena is
//! the sole owner of every leaf, so dropping the tree cannot free a leaf
//! twice through the chain.
//!
//! Appending past capacity or out of key order is a caller bug, not a
//! runtime condition, and panics rather than corrupting the sort order.

use crate::node::NodeId;

#[derive(Debug)]
pub(crate) struct Leaf<K, V> {
    entries: Vec<(K, V)>,
    next: Option<NodeId>,
}

impl<K: Ord, V> Leaf<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends an entry at the next free slot. The caller guarantees
    /// ascending key order; the leaf does not re-sort.
    pub(crate) fn push(&mut self, key: K, value: V, capacity: usize) {
        assert!(
            self.entries.len() < capacity,
            "append to a full leaf node (capacity {capacity})"
        );
        debug_assert!(
            self.entries.last().map_or(true, |(last, _)| *last <= key),
            "leaf entries appended out of key order"
        );
        self.entries.push((key, value));
    }

    pub(crate) fn key_at(&self, index: usize) -> &K {
        &self.entries[index].0
    }

    pub(crate) fn entry_at(&self, index: usize) -> (&K, &V) {
        let (key, value) = &self.entries[index];
        (key, value)
    }

    /// Largest key in the leaf. The bulk loader records it as the separator
    /// for the parent level.
    pub(crate) fn max_key(&self) -> &K {
        let (key, _) = self.entries.last().expect("max_key of an empty leaf");
        key
    }

    /// Leftmost position whose key is >= `key`; `len()` if no such entry.
    /// With duplicate keys this is the first of the run.
    pub(crate) fn lower_bound(&self, key: &K) -> usize {
        self.entries.partition_point(|(k, _)| k < key)
    }

    pub(crate) fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Links the successor leaf. Set once by the bulk loader.
    pub(crate) fn set_next(&mut self, next: NodeId) {
        debug_assert!(self.next.is_none(), "leaf chain link set twice");
        self.next = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_with(keys: &[u64]) -> Leaf<u64, u64> {
        let mut leaf = Leaf::with_capacity(keys.len());
        for &k in keys {
            leaf.push(k, k * 10, keys.len());
        }
        leaf
    }

    #[test]
    fn push_appends_in_order() {
        let leaf = leaf_with(&[1, 2, 3]);

        assert_eq!(leaf.len(), 3);
        assert_eq!(leaf.entry_at(0), (&1, &10));
        assert_eq!(leaf.entry_at(2), (&3, &30));
        assert_eq!(*leaf.max_key(), 3);
    }

    #[test]
    #[should_panic(expected = "full leaf")]
    fn push_past_capacity_panics() {
        let mut leaf: Leaf<u64, u64> = Leaf::with_capacity(1);
        leaf.push(1, 10, 1);
        leaf.push(2, 20, 1);
    }

    #[test]
    fn lower_bound_exact_and_between() {
        let leaf = leaf_with(&[10, 20, 30]);

        assert_eq!(leaf.lower_bound(&10), 0);
        assert_eq!(leaf.lower_bound(&15), 1);
        assert_eq!(leaf.lower_bound(&30), 2);
        assert_eq!(leaf.lower_bound(&31), 3);
        assert_eq!(leaf.lower_bound(&5), 0);
    }

    #[test]
    fn lower_bound_duplicates_returns_first_of_run() {
        let leaf = leaf_with(&[10, 20, 20, 20, 30]);

        assert_eq!(leaf.lower_bound(&20), 1);
    }

    #[test]
    fn chain_link_starts_absent() {
        let mut leaf = leaf_with(&[1]);

        assert_eq!(leaf.next(), None);
        leaf.set_next(NodeId::new(7));
        assert_eq!(leaf.next(), Some(NodeId::new(7)));
    }
}
