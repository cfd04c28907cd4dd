//! Disk-resident B+ tree.
//!
//! # Structure
//! - [`node`] - Internal and leaf node page layouts
//! - [`BPlusTree`] - The tree handle, split across:
//!   - `tree` - open/close, point lookup, introspection
//!   - `navigator` - root-to-leaf descent
//!   - `insert` - upsert with leaf/internal splits and root promotion
//!   - `delete` - leaf-local removal
//!   - `range` - [`RangeScan`] over the leaf chain
//!   - `verify` - structural checker
//!
//! Leaf splits copy the boundary key up: the right leaf's first key becomes
//! the separator and stays in the leaf. Internal splits move the middle key
//! up and keep it in neither half.

mod delete;
mod insert;
mod navigator;
pub mod node;
mod range;
mod tree;
mod verify;

pub use node::{InternalNode, LeafNode, Node};
pub use range::RangeScan;
pub use tree::BPlusTree;
pub use verify::TreeSummary;
