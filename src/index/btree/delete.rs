//! Deletion: leaf-local removal.
//!
//! Leaves are never merged or rebalanced and separators in internal nodes
//! are left untouched. A separator may therefore outlive the key it was
//! copied from; routing only compares against separators, so lookups are
//! unaffected. Leaves may become empty and stay in the chain.

use crate::common::{Key, Result};
use crate::index::btree::BPlusTree;

impl BPlusTree {
    /// Remove `key`.
    ///
    /// Returns `Ok(true)` if the key was present and removed, `Ok(false)` if
    /// it was absent.
    pub fn delete_data(&mut self, key: Key) -> Result<bool> {
        self.store.ensure_operational()?;

        let (leaf_page, mut leaf) = self.find_leaf(key, None)?;
        let Ok(index) = leaf.search(key) else {
            return Ok(false);
        };

        leaf.remove_at(index);
        self.write_leaf(leaf_page, &leaf)?;
        Ok(true)
    }
}
