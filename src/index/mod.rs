//! Index structures.
//!
//! - [`btree`] - Disk-resident B+ tree over `i32` keys and 100-byte values

pub mod btree;

pub use btree::{BPlusTree, RangeScan, TreeSummary};
