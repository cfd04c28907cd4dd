//! Configuration for pagetree.
//!
//! Format constants are fixed at compile time: changing any of them changes
//! the on-disk layout. Runtime knobs live in [`TreeOptions`].

/// Size of a page in bytes (4KB).
///
/// Every page in the index file, including the header page, is exactly this
/// size. The header records it and `open` refuses files written with a
/// different value.
pub const PAGE_SIZE: usize = 4096;

/// Size of every value record in bytes.
pub const VALUE_SIZE: usize = 100;

/// Magic number identifying an index file ("BPT1").
pub const HEADER_MAGIC: u32 = 0x4250_5431;

/// Maximum number of separator keys in an internal node.
///
/// An internal node holds up to `INTERNAL_MAX_KEYS + 1` child pointers.
pub const INTERNAL_MAX_KEYS: usize = 128;

/// Maximum number of key/value entries in a leaf node.
pub const LEAF_MAX_KEYS: usize = 30;

/// Deepest descent the navigator will follow before declaring the file corrupt.
///
/// With a minimum fan-out of two, a tree this tall would need more pages than
/// a `u32` page id can address.
pub const MAX_TREE_HEIGHT: usize = 32;

/// Maximum number of pages with u32 PageId (the top id is the sentinel).
pub const MAX_PAGES: u64 = u32::MAX as u64;

/// Runtime options for opening a tree.
///
/// # Example
/// ```
/// use pagetree::common::config::TreeOptions;
///
/// let opts = TreeOptions::default().sync_writes(false);
/// assert!(!opts.sync_writes);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Call `fsync()` after every page write and allocation.
    pub sync_writes: bool,
}

impl TreeOptions {
    /// Set whether page writes are followed by `fsync()`.
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { sync_writes: true }
    }
}
