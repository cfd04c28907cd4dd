//! The tree handle: open, close, point lookup and introspection.

use std::path::Path;

use tracing::{debug, warn};

use crate::common::{Key, PageId, Result, TreeOptions, Value};
use crate::index::btree::node::{LeafNode, Node};
use crate::storage::{DiskManager, StatsSnapshot};

/// A disk-resident B+ tree mapping `i32` keys to 100-byte values.
///
/// Only the pages an operation touches are held in memory, and only for the
/// duration of that operation. Every operation takes `&mut self`: one handle
/// owns the file, and no two page mutations can overlap.
///
/// # Durability
/// Splits write several pages and, on a root change, the header. There is no
/// write-ahead log: if the process dies partway through, already-written pages
/// stay written and the file may be left inconsistent.
///
/// # Example
/// ```no_run
/// use pagetree::{BPlusTree, Value};
///
/// let mut tree = BPlusTree::open("index.db")?;
/// tree.write_data(7, &Value::from_str_padded("seven"))?;
/// assert_eq!(tree.read_data(7)?, Some(Value::from_str_padded("seven")));
/// assert!(tree.delete_data(7)?);
/// # Ok::<(), pagetree::Error>(())
/// ```
pub struct BPlusTree {
    pub(super) store: DiskManager,
    closed: bool,
}

impl BPlusTree {
    /// Open an index file with default options, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, TreeOptions::default())
    }

    /// Open an index file, creating it if needed.
    ///
    /// A missing or empty file is initialised with a header page and an
    /// empty root leaf at page 1. An existing file must carry a valid header.
    /// The header is written last during initialisation, so a file whose
    /// initialisation was cut short has no magic and is refused with
    /// `Error::InvalidHeader`; delete it and open again.
    ///
    /// # Errors
    /// - `Error::InvalidHeader` if the magic or page size does not match
    /// - `Error::Corruption` if the file is truncated or the root is unusable
    /// - I/O errors from the underlying file
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: TreeOptions) -> Result<Self> {
        let mut store = DiskManager::open(path, options)?;

        if store.is_empty() {
            Self::init_empty_tree(&mut store)?;
        } else {
            store.load_header()?;
            debug!(root = %store.root_page(), pages = store.page_count(), "loaded index header");
        }

        Ok(Self {
            store,
            closed: false,
        })
    }

    fn init_empty_tree(store: &mut DiskManager) -> Result<()> {
        let header = store.allocate_page()?;
        debug_assert!(header.is_header());

        let root = store.allocate_page()?;
        store.write_page(root, &LeafNode::empty().encode())?;

        // Header goes last: a file whose init was cut short has no magic.
        // It is refused on open rather than guessed at.
        store.set_root(root)?;
        debug!(%root, "initialised empty index");
        Ok(())
    }

    /// Look up `key`.
    ///
    /// Returns `Ok(None)` if the key is absent; errors are reserved for I/O
    /// failure and corruption.
    pub fn read_data(&mut self, key: Key) -> Result<Option<Value>> {
        self.store.ensure_operational()?;
        let (_, leaf) = self.find_leaf(key, None)?;
        Ok(leaf.get(key).copied())
    }

    /// Write the header and sync the file.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush_header()?;
        self.store.sync()
    }

    /// Flush and close the tree, reporting any error.
    ///
    /// Dropping the tree also flushes the header, but can only log failures.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        let result = self.flush();
        debug!(ok = result.is_ok(), "closed index");
        result
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[inline]
    pub fn root_page_id(&self) -> PageId {
        self.store.root_page()
    }

    /// Number of pages in the file, header included.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.store.page_count()
    }

    /// False once a header write has failed.
    #[inline]
    pub fn is_operational(&self) -> bool {
        self.store.ensure_operational().is_ok()
    }

    /// Number of levels from the root to the leaves; 1 for a lone root leaf.
    pub fn height(&mut self) -> Result<usize> {
        self.store.ensure_operational()?;
        let mut page_id = self.store.root_page();
        let mut height = 1;
        loop {
            match self.read_node(page_id)? {
                Node::Leaf(_) => return Ok(height),
                Node::Internal(node) => {
                    page_id = node.children[0];
                    height += 1;
                }
            }
            self.check_depth(height)?;
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.store.stats().snapshot()
    }
}

impl Drop for BPlusTree {
    fn drop(&mut self) {
        if self.closed || !self.is_operational() {
            return;
        }
        if let Err(e) = self.store.flush_header() {
            warn!(error = %e, "failed to flush index header on drop");
        }
    }
}
