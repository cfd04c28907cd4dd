//! Disk Manager - the page store behind the tree.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Appending new pages
//! - Loading, validating and flushing the header page

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::common::config::{TreeOptions, MAX_PAGES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::{FileHeader, IoStats};

/// Manages disk I/O for a single index file.
///
/// # File Layout
/// The index is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ header  │ root    │ node    │         │ node    │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Pages are only ever appended; nothing is freed or reused.
///
/// # Ownership
/// `DiskManager` owns the file handle and the in-memory copy of the header.
/// Every method that touches the file takes `&mut self`, so a page mutation
/// can never alias another one.
///
/// # Failure
/// A failed header write leaves the on-disk root in an unknown state. From
/// then on the manager is poisoned and [`DiskManager::ensure_operational`]
/// returns `Error::NotOperational`.
pub struct DiskManager {
    file: File,
    /// Number of whole pages in the file.
    page_count: u32,
    /// In-memory copy of page 0.
    header: FileHeader,
    sync_writes: bool,
    poisoned: bool,
    stats: IoStats,
    /// Writes left before `write_at` starts failing.
    #[cfg(test)]
    writes_until_failure: Option<u32>,
}

impl DiskManager {
    /// Open an index file, creating it if it doesn't exist.
    ///
    /// The header is not read here: callers check [`DiskManager::is_empty`]
    /// and either initialise the file or call [`DiskManager::load_header`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P, options: TreeOptions) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.as_ref())?;

        let file_size = file.metadata()?.len();
        if file_size > 0 && file_size < PAGE_SIZE as u64 {
            return Err(Error::corruption(format!(
                "file is {} bytes, shorter than the header page",
                file_size
            )));
        }
        let page_count = (file_size / PAGE_SIZE as u64) as u32;
        if file_size % PAGE_SIZE as u64 != 0 {
            warn!(file_size, "index file has a trailing partial page, ignoring it");
        }
        debug!(path = %path.as_ref().display(), page_count, "opened index file");

        Ok(Self {
            file,
            page_count,
            header: FileHeader::new(PageId::FIRST_ROOT),
            sync_writes: options.sync_writes,
            poisoned: false,
            stats: IoStats::new(),
            #[cfg(test)]
            writes_until_failure: None,
        })
    }

    /// True if the file holds no complete page yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }

    /// Read a page from disk.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page doesn't exist.
    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        if !page_id.is_valid() || page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        self.file.seek(SeekFrom::Start(page_id.file_offset(PAGE_SIZE)))?;

        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;
        IoStats::bump(&self.stats.pages_read);

        Ok(page)
    }

    /// Write a page to disk.
    ///
    /// The page must have been previously allocated with `allocate_page()`.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page hasn't been allocated.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if !page_id.is_valid() || page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        self.write_at(page_id, page.as_slice())?;
        IoStats::bump(&self.stats.pages_written);
        Ok(())
    }

    /// Append a zero-filled page at the end of the file.
    ///
    /// Ids are dense: the new page's id is the old page count.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        if self.page_count as u64 >= MAX_PAGES {
            return Err(Error::corruption("page id space exhausted"));
        }
        let page_id = PageId::new(self.page_count);

        self.write_at(page_id, &[0u8; PAGE_SIZE])?;

        self.page_count += 1;
        IoStats::bump(&self.stats.pages_allocated);
        trace!(%page_id, "allocated page");
        Ok(page_id)
    }

    fn write_at(&mut self, page_id: PageId, bytes: &[u8]) -> Result<()> {
        self.injected_failure()?;
        self.file.seek(SeekFrom::Start(page_id.file_offset(PAGE_SIZE)))?;
        self.file.write_all(bytes)?;
        if self.sync_writes {
            self.file.sync_all()?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn injected_failure(&mut self) -> Result<()> {
        match self.writes_until_failure.as_mut() {
            Some(0) => Err(std::io::Error::other("injected write failure").into()),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    #[cfg(not(test))]
    #[inline(always)]
    fn injected_failure(&mut self) -> Result<()> {
        Ok(())
    }

    // ========================================================================
    // Header page
    // ========================================================================

    /// Read page 0 and validate it.
    ///
    /// # Errors
    /// - `Error::InvalidHeader` on magic or page size mismatch
    /// - `Error::Corruption` if the root id is unusable
    /// - I/O errors from the read
    pub fn load_header(&mut self) -> Result<FileHeader> {
        let page = self.read_page(PageId::HEADER)?;
        let header = FileHeader::decode(&page);
        header.validate()?;
        if header.root_page.0 >= self.page_count {
            return Err(Error::corruption(format!(
                "root {} lies beyond the {} pages in the file",
                header.root_page, self.page_count
            )));
        }

        self.header = header;
        Ok(header)
    }

    /// Write the in-memory header to page 0.
    ///
    /// A failure poisons the manager.
    pub fn flush_header(&mut self) -> Result<()> {
        self.ensure_operational()?;
        let page = self.header.encode();
        self.write_page(PageId::HEADER, &page).inspect_err(|e| {
            warn!(error = %e, "header flush failed, index is no longer operational");
            self.poisoned = true;
        })
    }

    /// Point the header at a new root and flush it.
    pub fn set_root(&mut self, root: PageId) -> Result<()> {
        self.header.root_page = root;
        self.flush_header()
    }

    /// Force everything written so far down to the device.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    #[inline]
    pub fn root_page(&self) -> PageId {
        self.header.root_page
    }

    /// Fail with `Error::NotOperational` once a header write has failed.
    #[inline]
    pub fn ensure_operational(&self) -> Result<()> {
        if self.poisoned {
            Err(Error::NotOperational)
        } else {
            Ok(())
        }
    }

    /// Let `writes` more page writes through, then fail every one after.
    /// `None` turns failures off again.
    #[cfg(test)]
    pub(crate) fn fail_writes_after(&mut self, writes: Option<u32>) {
        self.writes_until_failure = writes;
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Get the number of pages in the file.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Get the total size of the file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    #[inline]
    pub fn stats(&self) -> &IoStats {
        &self.stats
    }
}
