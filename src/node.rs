//! Closed node variant and arena addressing.
//!
//! Every node is either a leaf or an interior node, expressed as a tagged
//! enum so each operation handles both variants exhaustively at compile
//! time. Nodes live in the tree-owned arena (`Vec<Node>`) and refer to each
//! other by `NodeId` index; parent-to-child edges and the leaf chain are both
//! plain indices, so the arena is the single owner of every node and
//! releases them all at once when the tree drops.

use crate::interior::Interior;
use crate::layout::NodeLayout;
use crate::leaf::Leaf;

/// Index of a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub(crate) enum Node<K, V> {
    Leaf(Leaf<K, V>),
    Interior(Interior<K>),
}

impl<K: Ord, V> Node<K, V> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Interior(interior) => interior.len(),
        }
    }

    pub(crate) fn is_full(&self, layout: &NodeLayout<K, V>) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.len() == layout.leaf_capacity(),
            Node::Interior(interior) => interior.len() == layout.inner_capacity(),
        }
    }

    /// Largest key reachable through this node.
    pub(crate) fn max_key(&self) -> &K {
        match self {
            Node::Leaf(leaf) => leaf.max_key(),
            Node::Interior(interior) => interior.max_key(),
        }
    }

    pub(crate) fn as_leaf(&self) -> &Leaf<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Interior(_) => unreachable!("leaf reference points at an interior node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut Leaf<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Interior(_) => unreachable!("leaf reference points at an interior node"),
        }
    }
}
