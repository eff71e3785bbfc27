//! Bulk-loaded, read-only B+tree.
//!
//! # Structure
//!
//! The tree consists of:
//! - Internal nodes: store separator keys and child handles
//! - Leaf nodes: store key-value pairs, doubly-linked for in-order scans
//!
//! # Building
//!
//! Records are sorted, sliced into leaves of `floor(2 * order * load)`
//! records, and grouped level by level into parents of at most
//! `floor(2 * order * load) + 1` children until one root remains.
//!
//! # Usage
//!
//! ```
//! use bulktree::btree::BPlusTree;
//! use bulktree::config::BuildConfig;
//!
//! let records = vec![(3, "c"), (1, "a"), (2, "b")];
//! let tree = BPlusTree::build(records, &BuildConfig::new(1, 0.5)).expect("valid config");
//!
//! assert_eq!(tree.get(&2), Ok(&"b"));
//! assert_eq!(tree.iter().count(), 3);
//! ```

mod level;
mod node;
mod partition;
mod tree;

pub use level::{balanced_group_sizes, group_count, zigzag_groups};
pub use node::{InternalNode, LeafNode, Node, NodeId, NodeType, RoutingRule};
pub use partition::RemainderPolicy;
pub use tree::{BPlusTree, BuildError, Leaves, LookupError};
