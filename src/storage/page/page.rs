//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between disk and memory. The node codec and the file header both
//! encode into and decode out of a `Page`.

use crate::common::config::PAGE_SIZE;

use super::node_header::NodeHeader;

/// A page of data (4KB, 4KB-aligned).
///
/// # Memory Layout
/// - Size: 4096 bytes (4KB)
/// - Alignment: 4096 bytes
///
/// All multi-byte fields are stored little-endian. The accessors below
/// take absolute byte offsets and panic if the field would run past the
/// end of the page; every offset used by the codecs is a constant that
/// is checked at compile time to fit.
///
/// `Page` does not implement `Clone`; copying 4KB should be explicit.
///
/// # Example
/// ```
/// use pagetree::storage::page::Page;
///
/// let mut page = Page::new();
/// page.put_u32(8, 0xDEADBEEF);
/// assert_eq!(page.get_u32(8), 0xDEADBEEF);
/// assert_eq!(page.as_slice()[8], 0xEF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn get_u32(&self, offset: usize) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.data[offset..offset + 4]);
        u32::from_le_bytes(buf)
    }

    #[inline]
    pub fn put_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn get_i32(&self, offset: usize) -> i32 {
        self.get_u32(offset) as i32
    }

    #[inline]
    pub fn put_i32(&mut self, offset: usize, value: i32) {
        self.put_u32(offset, value as u32);
    }

    /// Borrow `len` bytes starting at `offset`.
    #[inline]
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Copy `src` into the page at `offset`.
    #[inline]
    pub fn put_bytes(&mut self, offset: usize, src: &[u8]) {
        self.data[offset..offset + src.len()].copy_from_slice(src);
    }

    /// Read the shared node header.
    pub fn node_header(&self) -> NodeHeader {
        NodeHeader::from_bytes(&self.data)
    }

    /// Write the shared node header.
    pub fn set_node_header(&mut self, header: &NodeHeader) {
        header.write_to(&mut self.data);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
