//! Page identifier type.

use std::fmt;

/// Identifies a page in the index file.
///
/// Ids are dense and 0-based: page `N` lives at byte offset `N × PAGE_SIZE`.
/// Page 0 is always the file header; tree nodes start at page 1.
///
/// # Example
/// ```
/// use pagetree::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert!(!page_id.is_header());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Sentinel page ID, `0xFFFFFFFF` on disk.
    ///
    /// Marks the end of the leaf chain and the empty free list.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// The header page.
    pub const HEADER: PageId = PageId(0);

    /// The root leaf of a freshly initialised tree.
    pub const FIRST_ROOT: PageId = PageId(1);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Check if this is the reserved header page.
    #[inline]
    pub fn is_header(&self) -> bool {
        *self == Self::HEADER
    }

    /// Byte offset of this page within the file.
    #[inline]
    pub fn file_offset(&self, page_size: usize) -> u64 {
        (self.0 as u64) * (page_size as u64)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_invalid() {
        assert!(!PageId::INVALID.is_valid());
        assert_eq!(PageId::INVALID.0, 0xFFFF_FFFF);
    }

    #[test]
    fn test_page_id_header() {
        assert!(PageId::HEADER.is_header());
        assert!(!PageId::FIRST_ROOT.is_header());
    }

    #[test]
    fn test_file_offset() {
        assert_eq!(PageId::new(0).file_offset(4096), 0);
        assert_eq!(PageId::new(3).file_offset(4096), 12288);
        assert_eq!(
            PageId::new(u32::MAX - 1).file_offset(4096),
            (u32::MAX as u64 - 1) * 4096
        );
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(42)), "Page(42)");
        assert_eq!(format!("{}", PageId::INVALID), "Page(INVALID)");
    }
}
