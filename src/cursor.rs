//! # Cursors and Ranges
//!
//! A cursor is a position in the leaf chain: the current leaf plus an entry
//! index within it. Forward iteration walks entries within the leaf and
//! follows the chain link at the leaf boundary, so a full scan never touches
//! interior nodes and its cost is independent of tree shape.
//!
//! The canonical end-of-tree cursor sits one past the last entry of the last
//! leaf (or carries no leaf at all for an empty tree); advancing it is a
//! no-op. Two cursors are equal iff they reference the same tree, the same
//! leaf, and the same position, so `iter() == end_cursor()` holds exactly for
//! the empty tree.
//!
//! Cursors are forward-only and single-pass, but cheap to copy; a fresh
//! `iter()` restarts from the first leaf any number of times.

use crate::node::NodeId;
use crate::tree::BTree;

/// Read-only position in a tree's leaf chain.
pub struct Cursor<'a, K, V> {
    tree: &'a BTree<K, V>,
    leaf: Option<NodeId>,
    index: usize,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.leaf == other.leaf && self.index == other.index
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K, V> std::fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("leaf", &self.leaf)
            .field("index", &self.index)
            .finish()
    }
}

impl<'a, K: Ord, V> Cursor<'a, K, V> {
    pub(crate) fn new(tree: &'a BTree<K, V>, leaf: Option<NodeId>, index: usize) -> Self {
        Self { tree, leaf, index }
    }

    /// The key-value pair under the cursor, or `None` at end of tree.
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        let leaf = self.tree.leaf(self.leaf?);
        if self.index < leaf.len() {
            Some(leaf.entry_at(self.index))
        } else {
            None
        }
    }

    pub fn key(&self) -> Option<&'a K> {
        self.entry().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.entry().map(|(_, value)| value)
    }

    /// Moves to the next entry, following the leaf chain at leaf boundaries.
    /// Advancing the end-of-tree cursor is a no-op.
    pub fn advance(&mut self) {
        let Some(leaf_id) = self.leaf else { return };
        let leaf = self.tree.leaf(leaf_id);
        if self.index < leaf.len() {
            self.index += 1;
        }
        if self.index >= leaf.len() {
            if let Some(next) = leaf.next() {
                self.leaf = Some(next);
                self.index = 0;
            }
        }
    }
}

impl<'a, K: Ord, V> Iterator for Cursor<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.entry()?;
        self.advance();
        Some(item)
    }
}

/// Half-open run of entries bounded by two cursors.
pub struct Range<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    end: Cursor<'a, K, V>,
}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Range<'_, K, V> {}

impl<K, V> std::fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Range")
            .field("cursor", &self.cursor)
            .field("end", &self.end)
            .finish()
    }
}

impl<'a, K: Ord, V> Range<'a, K, V> {
    pub(crate) fn new(start: Cursor<'a, K, V>, end: Cursor<'a, K, V>) -> Self {
        Self { cursor: start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == self.end
    }
}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == self.end {
            return None;
        }
        let item = self.cursor.entry()?;
        self.cursor.advance();
        Some(item)
    }
}
