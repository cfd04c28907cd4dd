//! pagetree - a disk-resident B+ tree index.
//!
//! Maps `i32` keys to fixed 100-byte values in a single file of 4KB pages.
//! Only the pages an operation touches are in memory, and only while it runs.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           pagetree                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/btree)                   │   │
//! │  │   write_data / delete_data / read_data / read_range_data │   │
//! │  │   Navigator → Insert (split + promote) | Delete | Range  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Node Codec (index/btree/node)               │   │
//! │  │          InternalNode | LeafNode  ⇄  Page bytes          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                    │   │
//! │  │        DiskManager + FileHeader + Page + IoStats         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Key, Value, Error, config)
//! - [`storage`] - Page store and page formats
//! - [`index`] - The B+ tree
//!
//! # Quick Start
//! ```no_run
//! use pagetree::{BPlusTree, Value};
//!
//! let mut tree = BPlusTree::open("my_index.db").unwrap();
//!
//! for key in 1..=40 {
//!     tree.write_data(key, &Value::from_str_padded(&format!("v{key}"))).unwrap();
//! }
//! let values = tree.read_range_data(10, 20).unwrap();
//! assert_eq!(values.len(), 11);
//! ```
//!
//! # Not provided
//! No write-ahead log, no concurrent access, no page reuse, and no
//! rebalancing on delete. Pages are appended and never freed.

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PAGE_SIZE, VALUE_SIZE};
pub use common::{Error, Key, PageId, Result, TreeOptions, Value};

pub use index::{BPlusTree, RangeScan, TreeSummary};
pub use storage::{IoStats, StatsSnapshot};
