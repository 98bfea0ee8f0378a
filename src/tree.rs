//! # Bulk-Loaded B+Tree
//!
//! This module implements the tree handle: ownership of the node arena,
//! bottom-up bulk construction, and the read-only query surface.
//!
//! ## Architecture Overview
//!
//! The tree is built exactly once from pre-sorted input and is immutable
//! afterward. All data lives in leaf nodes; interior nodes carry
//! `(separator, child)` entries where the separator is the maximum key of
//! the child's subtree. Leaves are chained in key order so ordered scans
//! bypass the interior structure entirely:
//!
//! ```text
//!                      [Interior (root)]
//!                      /               \
//!            [Interior]                 [Interior]
//!            /        \                     |
//!      [Leaf 1,2] [Leaf 3,4]            [Leaf 5]
//!          |----------->|------------------>|        (leaf chain)
//! ```
//!
//! ## Bulk Loading
//!
//! Construction is a single bottom-up pass over the sorted input:
//!
//! 1. Partition the input into consecutive runs, each filling one leaf to
//!    capacity (only the last may be partial). Link each leaf to its
//!    successor while building it and record its maximum key.
//! 2. Partition the produced nodes the same way into interior nodes, each
//!    entry storing the child's recorded maximum as separator.
//! 3. Repeat until a single node remains; that node is the root. The height
//!    is the number of interior-building passes.
//!
//! Filling every non-final node to exact capacity maximizes fan-out and
//! minimizes height; this is a packing policy, not an accident. Empty input
//! produces an empty tree with no nodes at all.
//!
//! The input must already be sorted ascending by key. Sortedness is a caller
//! contract checked only by `debug_assert!`; an unsorted input silently
//! breaks the separator and chain invariants.
//!
//! ## Queries
//!
//! | Operation       | Cost                 |
//! |-----------------|----------------------|
//! | `find` / `get`  | O(log n)             |
//! | `find_range`    | O(log n + k) for k results |
//! | `iter`          | O(n) full scan       |
//! | `bulkload`      | O(n)                 |
//!
//! Descent follows each interior node's leftmost separator that is greater
//! than or equal to the key, with the last-child fallback for keys above
//! every separator, so out-of-range keys land in the leaf holding the
//! nearest existing range.
//!
//! ## Ownership
//!
//! The arena (`Vec<Node>`) is the single owner of every node; children and
//! the leaf chain are `NodeId` indices into it. Dropping the tree releases
//! the arena wholesale, so there is no recursive teardown and no way to free
//! a leaf twice through its chain link.
//!
//! ## Thread Safety
//!
//! The tree is immutable after construction; any number of cursors may read
//! it concurrently (`&BTree` is `Sync` for `Send + Sync` key/value types).
//! No concurrent mutation exists to synchronize.

use eyre::{ensure, Result};

use crate::cursor::{Cursor, Range};
use crate::interior::Interior;
use crate::layout::NodeLayout;
use crate::leaf::Leaf;
use crate::node::{Node, NodeId};

/// Ordered, read-only key-value index built by [`BTree::bulkload`].
#[derive(Debug)]
pub struct BTree<K, V> {
    layout: NodeLayout<K, V>,
    nodes: Vec<Node<K, V>>,
    root: Option<NodeId>,
    size: usize,
    height: usize,
}

impl<K: Ord, V> BTree<K, V> {
    /// Builds a tree from `pairs`, which must be sorted ascending by key.
    /// Duplicate keys are allowed and keep their input order.
    pub fn bulkload<I>(layout: NodeLayout<K, V>, pairs: I) -> Self
    where
        K: Clone,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tree = Self {
            layout,
            nodes: Vec::new(),
            root: None,
            size: 0,
            height: 0,
        };

        // Level 0: pack the input into chained leaves.
        let leaf_capacity = layout.leaf_capacity();
        let mut level: Vec<(K, NodeId)> = Vec::new();
        let mut pairs = pairs.into_iter().peekable();
        while pairs.peek().is_some() {
            let mut leaf = Leaf::with_capacity(leaf_capacity);
            while leaf.len() < leaf_capacity {
                match pairs.next() {
                    Some((key, value)) => {
                        leaf.push(key, value, leaf_capacity);
                        tree.size += 1;
                    }
                    None => break,
                }
            }
            debug_assert!(
                level.last().map_or(true, |(max, _)| max <= leaf.key_at(0)),
                "bulkload input not sorted across a leaf boundary"
            );
            let max = leaf.max_key().clone();
            let id = tree.alloc(Node::Leaf(leaf));
            if let Some(&(_, previous)) = level.last() {
                tree.leaf_mut(previous).set_next(id);
            }
            level.push((max, id));
        }

        if level.is_empty() {
            return tree;
        }

        // Upper levels: pack each level's nodes into interior nodes until a
        // single node remains.
        let inner_capacity = layout.inner_capacity();
        while level.len() > 1 {
            let mut parents = Vec::with_capacity(level.len().div_ceil(inner_capacity));
            let mut children = level.into_iter().peekable();
            while children.peek().is_some() {
                let mut interior = Interior::with_capacity(inner_capacity);
                while interior.len() < inner_capacity {
                    match children.next() {
                        Some((max, child)) => interior.push(max, child, inner_capacity),
                        None => break,
                    }
                }
                let max = interior.max_key().clone();
                let id = tree.alloc(Node::Interior(interior));
                parents.push((max, id));
            }
            level = parents;
            tree.height += 1;
        }

        tree.root = Some(level[0].1);
        tree
    }

    /// Number of key-value pairs in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of interior levels above the leaf level; 0 for an empty or
    /// single-leaf tree.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The layout this tree was built with.
    pub fn layout(&self) -> &NodeLayout<K, V> {
        &self.layout
    }

    /// Cursor at the smallest key-value pair; equals `end_cursor()` for an
    /// empty tree.
    pub fn iter(&self) -> Cursor<'_, K, V> {
        Cursor::new(self, self.first_leaf(), 0)
    }

    /// The canonical past-the-end cursor.
    pub fn end_cursor(&self) -> Cursor<'_, K, V> {
        match self.last_leaf() {
            Some(id) => Cursor::new(self, Some(id), self.leaf(id).len()),
            None => Cursor::new(self, None, 0),
        }
    }

    /// Cursor at the first entry with the given key, or `None` if the key is
    /// absent. With duplicates, the leftmost match.
    pub fn find(&self, key: &K) -> Option<Cursor<'_, K, V>> {
        let leaf_id = self.descend(key)?;
        let leaf = self.leaf(leaf_id);
        let index = leaf.lower_bound(key);
        if index < leaf.len() && leaf.key_at(index) == key {
            Some(Cursor::new(self, Some(leaf_id), index))
        } else {
            None
        }
    }

    /// Value of the first entry with the given key, if any.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key)?.value()
    }

    /// All entries with `lo <= key < hi`, in order. Empty if `lo >= hi` or
    /// the tree is empty.
    pub fn find_range(&self, lo: &K, hi: &K) -> Range<'_, K, V> {
        let end = self.end_cursor();
        if self.root.is_none() || lo >= hi {
            return Range::new(end, end);
        }
        Range::new(self.seek(lo), self.seek(hi))
    }

    /// The maximal run of entries whose key equals `key`, in bulk-load
    /// order.
    pub fn equal_range(&self, key: &K) -> Range<'_, K, V> {
        if self.root.is_none() {
            let end = self.end_cursor();
            return Range::new(end, end);
        }
        let start = self.seek(key);
        let mut stop = start;
        while let Some(found) = stop.key() {
            if found == key {
                stop.advance();
            } else {
                break;
            }
        }
        Range::new(start, stop)
    }

    /// Cursor at the first entry with key >= `bound`: descend to the leaf
    /// that would contain `bound`, then advance along the leaf chain.
    fn seek(&self, bound: &K) -> Cursor<'_, K, V> {
        let Some(leaf_id) = self.descend(bound) else {
            return self.end_cursor();
        };
        let mut cursor = Cursor::new(self, Some(leaf_id), 0);
        while let Some(key) = cursor.key() {
            if key >= bound {
                break;
            }
            cursor.advance();
        }
        cursor
    }

    /// Leaf that would contain `key`, per the interior descent rule.
    fn descend(&self, key: &K) -> Option<NodeId> {
        let mut id = self.root?;
        loop {
            match self.node(id) {
                Node::Leaf(_) => return Some(id),
                Node::Interior(interior) => id = interior.child_for(key),
            }
        }
    }

    fn first_leaf(&self) -> Option<NodeId> {
        let mut id = self.root?;
        loop {
            match self.node(id) {
                Node::Leaf(_) => return Some(id),
                Node::Interior(interior) => id = interior.first_child(),
            }
        }
    }

    fn last_leaf(&self) -> Option<NodeId> {
        let mut id = self.root?;
        loop {
            match self.node(id) {
                Node::Leaf(_) => return Some(id),
                Node::Interior(interior) => id = interior.last_child(),
            }
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        assert!(
            self.nodes.len() < u32::MAX as usize,
            "node arena exceeds u32 index space"
        );
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.index()]
    }

    pub(crate) fn leaf(&self, id: NodeId) -> &Leaf<K, V> {
        self.node(id).as_leaf()
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut Leaf<K, V> {
        self.nodes[id.index()].as_leaf_mut()
    }

    /// Walks the whole structure and checks every construction invariant:
    /// sort order within nodes, separator = subtree maximum, uniform leaf
    /// depth, per-level packing, chain order, and the cached size and
    /// height. Intended for tests and debugging.
    pub fn verify(&self) -> Result<()> {
        let Some(root) = self.root else {
            ensure!(self.size == 0, "empty tree reports size {}", self.size);
            ensure!(self.height == 0, "empty tree reports height {}", self.height);
            ensure!(
                self.nodes.is_empty(),
                "empty tree holds {} nodes",
                self.nodes.len()
            );
            return Ok(());
        };

        let (height, count) = self.verify_subtree(root)?;
        ensure!(
            height == self.height,
            "cached height {} does not match structural height {}",
            self.height,
            height
        );
        ensure!(
            count == self.size,
            "cached size {} does not match stored entry count {}",
            self.size,
            count
        );

        // All but the final node of each level must be filled to capacity.
        let mut level = vec![root];
        loop {
            for (position, &id) in level.iter().enumerate() {
                if position + 1 < level.len() {
                    ensure!(
                        self.node(id).is_full(&self.layout),
                        "non-final node at a level holds {} entries, below capacity",
                        self.node(id).len()
                    );
                }
            }
            let mut next = Vec::new();
            for &id in &level {
                if let Node::Interior(interior) = self.node(id) {
                    for position in 0..interior.len() {
                        next.push(interior.child_at(position));
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            level = next;
        }

        // The leaf chain must mirror the in-order leaf sequence.
        let mut in_order = Vec::new();
        self.collect_leaves(root, &mut in_order);
        let mut chain = Vec::new();
        let mut current = self.first_leaf();
        while let Some(id) = current {
            chain.push(id);
            current = self.leaf(id).next();
        }
        ensure!(
            chain == in_order,
            "leaf chain order diverges from tree order"
        );

        // Keys must be globally non-decreasing along the chain.
        let mut previous: Option<&K> = None;
        for &id in &chain {
            let leaf = self.leaf(id);
            for position in 0..leaf.len() {
                let key = leaf.key_at(position);
                if let Some(previous) = previous {
                    ensure!(previous <= key, "leaf chain yields keys out of order");
                }
                previous = Some(key);
            }
        }

        Ok(())
    }

    fn verify_subtree(&self, id: NodeId) -> Result<(usize, usize)> {
        match self.node(id) {
            Node::Leaf(leaf) => {
                ensure!(
                    leaf.len() >= 1 && leaf.len() <= self.layout.leaf_capacity(),
                    "leaf occupancy {} outside [1, {}]",
                    leaf.len(),
                    self.layout.leaf_capacity()
                );
                for position in 1..leaf.len() {
                    ensure!(
                        leaf.key_at(position - 1) <= leaf.key_at(position),
                        "leaf entries out of key order"
                    );
                }
                Ok((0, leaf.len()))
            }
            Node::Interior(interior) => {
                ensure!(
                    interior.len() >= 1 && interior.len() <= self.layout.inner_capacity(),
                    "interior occupancy {} outside [1, {}]",
                    interior.len(),
                    self.layout.inner_capacity()
                );
                let mut count = 0;
                let mut child_height = None;
                for position in 0..interior.len() {
                    if position > 0 {
                        ensure!(
                            interior.separator_at(position - 1) <= interior.separator_at(position),
                            "interior separators out of order"
                        );
                    }
                    let child = interior.child_at(position);
                    let (sub_height, sub_count) = self.verify_subtree(child)?;
                    ensure!(
                        self.node(child).max_key() == interior.separator_at(position),
                        "separator does not equal the child subtree's maximum key"
                    );
                    match child_height {
                        None => child_height = Some(sub_height),
                        Some(height) => ensure!(
                            height == sub_height,
                            "children of one interior node have different heights"
                        ),
                    }
                    count += sub_count;
                }
                Ok((child_height.unwrap_or(0) + 1, count))
            }
        }
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.node(id) {
            Node::Leaf(_) => out.push(id),
            Node::Interior(interior) => {
                for position in 0..interior.len() {
                    self.collect_leaves(interior.child_at(position), out);
                }
            }
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a BTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Cursor<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
