//! # bulktree - Bulk-Loaded B+Tree Index
//!
//! An ordered key-value index packed into fixed-size, fixed-alignment nodes,
//! built once from pre-sorted input and read-only afterward. Sizing nodes to
//! a byte budget gives the predictable cache behavior of a paged structure
//! while the whole tree stays in memory.
//!
//! ## Quick Start
//!
//! ```
//! use bulktree::{BTree, NodeLayout};
//!
//! let layout = NodeLayout::new(256)?;
//! let tree = BTree::bulkload(layout, (0u64..100).map(|k| (k, k * 2)));
//!
//! assert_eq!(tree.size(), 100);
//! assert_eq!(tree.get(&21), Some(&42));
//! let in_window: Vec<_> = tree.find_range(&10, &13).collect();
//! assert_eq!(in_window.len(), 3);
//! # Ok::<(), eyre::Report>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------+
//! |      Tree handle (size, height)      |
//! +--------------------------------------+
//! |  Bulk loader  |  Search  |  Cursors  |
//! +--------------------------------------+
//! |   Node arena: Leaf / Interior enum   |
//! +--------------------------------------+
//! |  NodeLayout (byte budget -> fan-out) |
//! +--------------------------------------+
//! ```
//!
//! ## Module Overview
//!
//! - [`layout`]: node byte budget and the capacities derived from it
//! - [`tree`]: tree handle, bulk loader, point and range search
//! - [`cursor`]: leaf-chain cursors and half-open ranges
//! - `leaf` / `interior` / `node`: the two node variants and their arena
//!
//! ## Non-Goals
//!
//! No persistence or WAL, no concurrent mutation, no single-key insert or
//! delete: the tree is constructed by [`BTree::bulkload`] and queried.

mod interior;
mod leaf;
mod node;

pub mod cursor;
pub mod layout;
pub mod tree;

pub use cursor::{Cursor, Range};
pub use layout::NodeLayout;
pub use tree::BTree;
