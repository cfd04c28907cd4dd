//! File header - the contents of page 0.

use crate::common::config::{HEADER_MAGIC, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;

/// Format identity and tree root, stored in page 0.
///
/// # Layout (16 bytes, rest of the page zero)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     magic ("BPT1" = 0x42505431)
/// 4       4     page_size (must be 4096)
/// 8       4     root_page
/// 12      4     free_list_head (always 0xFFFFFFFF)
/// ```
///
/// Pages are never reclaimed, so `free_list_head` is only carried for
/// format compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u32,
    pub page_size: u32,
    pub root_page: PageId,
    pub free_list_head: PageId,
}

impl FileHeader {
    pub const OFFSET_MAGIC: usize = 0;
    pub const OFFSET_PAGE_SIZE: usize = 4;
    pub const OFFSET_ROOT: usize = 8;
    pub const OFFSET_FREE_LIST: usize = 12;

    /// Header for a freshly initialised tree rooted at `root_page`.
    pub fn new(root_page: PageId) -> Self {
        Self {
            magic: HEADER_MAGIC,
            page_size: PAGE_SIZE as u32,
            root_page,
            free_list_head: PageId::INVALID,
        }
    }

    /// Decode page 0 without checking it.
    pub fn decode(page: &Page) -> Self {
        Self {
            magic: page.get_u32(Self::OFFSET_MAGIC),
            page_size: page.get_u32(Self::OFFSET_PAGE_SIZE),
            root_page: PageId::new(page.get_u32(Self::OFFSET_ROOT)),
            free_list_head: PageId::new(page.get_u32(Self::OFFSET_FREE_LIST)),
        }
    }

    /// Encode into a full page, zero padded.
    pub fn encode(&self) -> Page {
        let mut page = Page::new();
        page.put_u32(Self::OFFSET_MAGIC, self.magic);
        page.put_u32(Self::OFFSET_PAGE_SIZE, self.page_size);
        page.put_u32(Self::OFFSET_ROOT, self.root_page.0);
        page.put_u32(Self::OFFSET_FREE_LIST, self.free_list_head.0);
        page
    }

    /// Check format identity and that the root names a node page.
    ///
    /// # Errors
    /// - `Error::InvalidHeader` on magic or page size mismatch
    /// - `Error::Corruption` if the root is the header page or the sentinel
    pub fn validate(&self) -> Result<()> {
        if self.magic != HEADER_MAGIC || self.page_size != PAGE_SIZE as u32 {
            return Err(Error::InvalidHeader {
                magic: self.magic,
                page_size: self.page_size,
            });
        }
        if self.root_page.is_header() || !self.root_page.is_valid() {
            return Err(Error::corruption(format!(
                "header names {} as the root",
                self.root_page
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_byte_layout() {
        let page = FileHeader::new(PageId::new(7)).encode();
        let bytes = page.as_slice();

        assert_eq!(&bytes[0..4], &[0x31, 0x54, 0x50, 0x42]);
        assert_eq!(&bytes[4..8], &4096u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &7u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &[0xFF; 4]);
        assert!(bytes[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_header_roundtrip_and_validate() {
        let header = FileHeader::new(PageId::FIRST_ROOT);
        let decoded = FileHeader::decode(&header.encode());
        assert_eq!(header, decoded);
        assert!(decoded.validate().is_ok());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut header = FileHeader::new(PageId::FIRST_ROOT);
        header.magic = 0x1234_5678;
        assert!(matches!(
            header.validate(),
            Err(Error::InvalidHeader { magic: 0x1234_5678, .. })
        ));
    }

    #[test]
    fn test_bad_page_size_rejected() {
        let mut header = FileHeader::new(PageId::FIRST_ROOT);
        header.page_size = 8192;
        assert!(matches!(
            header.validate(),
            Err(Error::InvalidHeader { page_size: 8192, .. })
        ));
    }

    #[test]
    fn test_root_at_header_page_rejected() {
        let header = FileHeader::new(PageId::HEADER);
        assert!(matches!(header.validate(), Err(Error::Corruption(_))));
    }
}
