//! # Node Layout Calculation
//!
//! This module computes how many entries fit in a tree node given a fixed
//! node byte budget, the way a disk-backed engine sizes its pages. Both node
//! variants are constrained to the same budget:
//!
//! ```text
//! Leaf node (node_size bytes):
//! +-------------------+----------------------------------------+
//! | header            | entries: (K, V) * leaf_capacity        |
//! | count + next link |                                        |
//! +-------------------+----------------------------------------+
//!
//! Interior node (node_size bytes):
//! +-------------------+----------------------------------------+
//! | header            | entries: (K, child) * inner_capacity   |
//! | count             |                                        |
//! +-------------------+----------------------------------------+
//! ```
//!
//! ## Capacity Formula
//!
//! ```text
//! leaf_capacity  = (node_size - leaf_header)  / size_of::<(K, V)>()
//! inner_capacity = (node_size - inner_header) / size_of::<(K, NodeId)>()
//! ```
//!
//! The leaf header covers the occupancy count and the next-leaf chain link;
//! the interior header covers the occupancy count only.
//!
//! ## Validation
//!
//! A layout that cannot hold at least one entry per variant is rejected at
//! construction, before any data is loaded. The alignment must be a power of
//! two, at least the natural alignment of both entry types, and must divide
//! `node_size`, so that an aligned block of `node_size` bytes can hold either
//! variant. All of this is checked exactly once; no per-operation validation
//! happens later.

use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use eyre::{ensure, Result};

use crate::node::NodeId;

/// Node byte budget, alignment, and the entry capacities derived from them.
///
/// A `NodeLayout` is fixed per tree: every node of a tree built from this
/// layout respects the same budget. The type parameters pin the layout to the
/// key and value types it was computed for.
pub struct NodeLayout<K, V> {
    node_size: usize,
    node_align: usize,
    leaf_capacity: usize,
    inner_capacity: usize,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Clone for NodeLayout<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeLayout<K, V> {}

impl<K, V> std::fmt::Debug for NodeLayout<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeLayout")
            .field("node_size", &self.node_size)
            .field("node_align", &self.node_align)
            .field("leaf_capacity", &self.leaf_capacity)
            .field("inner_capacity", &self.inner_capacity)
            .finish()
    }
}

/// Occupancy count plus the next-leaf link.
fn leaf_header_size() -> usize {
    size_of::<usize>() + size_of::<Option<NodeId>>()
}

/// Occupancy count only.
fn inner_header_size() -> usize {
    size_of::<usize>()
}

impl<K, V> NodeLayout<K, V> {
    /// Computes the layout for `node_size`-byte nodes aligned to `node_size`.
    pub fn new(node_size: usize) -> Result<Self> {
        Self::with_alignment(node_size, node_size)
    }

    /// Computes the layout for `node_size`-byte nodes with an explicit
    /// alignment.
    pub fn with_alignment(node_size: usize, node_align: usize) -> Result<Self> {
        let leaf_entry = size_of::<(K, V)>();
        let inner_entry = size_of::<(K, NodeId)>();
        let entry_align = align_of::<(K, V)>().max(align_of::<(K, NodeId)>());

        ensure!(
            node_align.is_power_of_two(),
            "node alignment {} is not a power of two",
            node_align
        );
        ensure!(
            node_align >= entry_align,
            "node alignment {} is below the entry alignment {}",
            node_align,
            entry_align
        );
        ensure!(
            node_size % node_align == 0,
            "node size {} is not a multiple of the alignment {}",
            node_size,
            node_align
        );
        ensure!(
            node_size > leaf_header_size() && node_size > inner_header_size(),
            "node size {} cannot fit a node header",
            node_size
        );

        let leaf_capacity = (node_size - leaf_header_size()) / leaf_entry;
        let inner_capacity = (node_size - inner_header_size()) / inner_entry;
        ensure!(
            leaf_capacity >= 1,
            "node size {} fits no leaf entry ({} bytes each after a {}-byte header)",
            node_size,
            leaf_entry,
            leaf_header_size()
        );
        ensure!(
            inner_capacity >= 1,
            "node size {} fits no interior entry ({} bytes each after a {}-byte header)",
            node_size,
            inner_entry,
            inner_header_size()
        );

        Ok(Self {
            node_size,
            node_align,
            leaf_capacity,
            inner_capacity,
            _marker: PhantomData,
        })
    }

    /// Builds a layout with an explicit fan-out instead of a byte budget.
    ///
    /// Useful in tests and for callers that want a fixed branching factor;
    /// the byte budget is back-filled as the smallest aligned block that
    /// holds the larger variant.
    pub fn with_capacities(leaf_capacity: usize, inner_capacity: usize) -> Result<Self> {
        ensure!(
            leaf_capacity >= 1 && inner_capacity >= 1,
            "node capacities must be at least 1 (got leaf={}, inner={})",
            leaf_capacity,
            inner_capacity
        );

        let leaf_bytes = leaf_header_size() + leaf_capacity * size_of::<(K, V)>();
        let inner_bytes = inner_header_size() + inner_capacity * size_of::<(K, NodeId)>();
        let node_align = align_of::<(K, V)>()
            .max(align_of::<(K, NodeId)>())
            .max(align_of::<usize>());
        let node_size = leaf_bytes.max(inner_bytes).next_multiple_of(node_align);

        Ok(Self {
            node_size,
            node_align,
            leaf_capacity,
            inner_capacity,
            _marker: PhantomData,
        })
    }

    /// Total bytes a node may occupy.
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Required node alignment.
    pub fn node_align(&self) -> usize {
        self.node_align
    }

    /// Key-value entries per leaf node.
    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Separator-child entries per interior node.
    pub fn inner_capacity(&self) -> usize {
        self.inner_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_math_for_word_sized_entries() {
        // (u64, u64) entries are 16 bytes; leaf header is 16, interior 8.
        let layout = NodeLayout::<u64, u64>::new(64).unwrap();

        assert_eq!(layout.node_size(), 64);
        assert_eq!(layout.node_align(), 64);
        assert_eq!(layout.leaf_capacity(), (64 - 16) / 16);
        assert_eq!(layout.inner_capacity(), (64 - 8) / 16);
    }

    #[test]
    fn larger_budget_fits_more_entries() {
        let small = NodeLayout::<u64, u64>::new(64).unwrap();
        let big = NodeLayout::<u64, u64>::new(4096).unwrap();

        assert!(big.leaf_capacity() > small.leaf_capacity());
        assert!(big.inner_capacity() > small.inner_capacity());
    }

    #[test]
    fn node_size_too_small_is_rejected() {
        let result = NodeLayout::<u64, [u8; 256]>::new(64);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no leaf entry"));
    }

    #[test]
    fn header_only_budget_is_rejected() {
        assert!(NodeLayout::<u64, u64>::new(16).is_err());
        assert!(NodeLayout::<u64, u64>::new(8).is_err());
    }

    #[test]
    fn alignment_must_be_power_of_two() {
        let result = NodeLayout::<u64, u64>::with_alignment(96, 24);

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("not a power of two"));
    }

    #[test]
    fn alignment_must_divide_node_size() {
        let result = NodeLayout::<u64, u64>::with_alignment(96, 64);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a multiple"));
    }

    #[test]
    fn alignment_below_entry_alignment_is_rejected() {
        let result = NodeLayout::<u64, u64>::with_alignment(64, 4);

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("below the entry alignment"));
    }

    #[test]
    fn explicit_capacities() {
        let layout = NodeLayout::<u64, u64>::with_capacities(2, 2).unwrap();

        assert_eq!(layout.leaf_capacity(), 2);
        assert_eq!(layout.inner_capacity(), 2);
        assert!(layout.node_size() >= 2 * 16);
        assert_eq!(layout.node_size() % layout.node_align(), 0);
    }

    #[test]
    fn explicit_zero_capacity_is_rejected() {
        assert!(NodeLayout::<u64, u64>::with_capacities(0, 2).is_err());
        assert!(NodeLayout::<u64, u64>::with_capacities(2, 0).is_err());
    }
}
