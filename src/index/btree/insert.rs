//! Insertion: point upsert, leaf and internal splits, root promotion.

use tracing::{debug, trace};

use crate::common::config::LEAF_MAX_KEYS;
use crate::common::{Error, Key, PageId, Result, Value};
use crate::index::btree::node::{InternalNode, LeafNode};
use crate::index::btree::BPlusTree;
use crate::storage::IoStats;

/// A split waiting to be absorbed by the next level up.
///
/// `right` is the freshly allocated sibling of `left`, and every key in
/// `right` is `>= key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Promotion {
    left: PageId,
    key: Key,
    right: PageId,
}

impl BPlusTree {
    /// Insert `key`, or overwrite its value if it is already present.
    ///
    /// All pages touched by a split, and the header on a root change, are
    /// written before this returns `Ok`. A failure partway leaves earlier
    /// writes in place.
    pub fn write_data(&mut self, key: Key, value: &Value) -> Result<()> {
        self.store.ensure_operational()?;

        let mut path = Vec::new();
        let (leaf_page, leaf) = self.find_leaf(key, Some(&mut path))?;

        match self.insert_in_leaf(leaf_page, leaf, key, *value)? {
            Some(promotion) => self.insert_in_parent(path, promotion),
            None => Ok(()),
        }
    }

    fn insert_in_leaf(
        &mut self,
        leaf_page: PageId,
        mut leaf: LeafNode,
        key: Key,
        value: Value,
    ) -> Result<Option<Promotion>> {
        let index = match leaf.search(key) {
            Ok(index) => {
                leaf.values[index] = value;
                self.write_leaf(leaf_page, &leaf)?;
                return Ok(None);
            }
            Err(index) => index,
        };

        leaf.insert_at(index, key, value);
        if leaf.len() <= LEAF_MAX_KEYS {
            self.write_leaf(leaf_page, &leaf)?;
            return Ok(None);
        }

        let right = leaf.split();
        let right_page = self.store.allocate_page()?;
        leaf.next_leaf = right_page;

        // Right first, so the left leaf never links to an unwritten page.
        self.write_leaf(right_page, &right)?;
        self.write_leaf(leaf_page, &leaf)?;
        IoStats::bump(&self.store.stats().leaf_splits);

        let separator = right.keys[0];
        trace!(left = %leaf_page, right = %right_page, separator, "split leaf");

        Ok(Some(Promotion {
            left: leaf_page,
            key: separator,
            right: right_page,
        }))
    }

    /// Push a split up the recorded path until some ancestor absorbs it.
    ///
    /// `path` runs from the root down to `promotion.left`.
    fn insert_in_parent(
        &mut self,
        mut path: Vec<PageId>,
        mut promotion: Promotion,
    ) -> Result<()> {
        loop {
            path.pop();
            let Some(&parent_page) = path.last() else {
                return self.promote_root(promotion);
            };

            let mut parent = self.read_internal(parent_page)?;
            let left_index = parent.position_of(promotion.left).ok_or_else(|| {
                Error::corruption(format!(
                    "{} is not a child of {}",
                    promotion.left, parent_page
                ))
            })?;

            if !parent.is_full() {
                parent.insert_after(left_index, promotion.key, promotion.right);
                return self.write_internal(parent_page, &parent);
            }

            parent.insert_after(left_index, promotion.key, promotion.right);
            let (mid_key, right) = parent.split();
            let right_page = self.store.allocate_page()?;

            // Right half first: until the shrunk left half lands, the old
            // parent still routes to every child.
            self.write_internal(right_page, &right)?;
            self.write_internal(parent_page, &parent)?;
            IoStats::bump(&self.store.stats().internal_splits);
            trace!(
                left = %parent_page,
                right = %right_page,
                separator = mid_key,
                "split internal node"
            );

            promotion = Promotion {
                left: parent_page,
                key: mid_key,
                right: right_page,
            };
        }
    }

    /// Grow the tree by one level above a split root.
    fn promote_root(&mut self, promotion: Promotion) -> Result<()> {
        debug_assert_eq!(promotion.left, self.store.root_page());

        let root = InternalNode::new_root(promotion.left, promotion.key, promotion.right);
        let root_page = self.store.allocate_page()?;
        self.write_internal(root_page, &root)?;
        self.store.set_root(root_page)?;

        IoStats::bump(&self.store.stats().root_promotions);
        debug!(root = %root_page, separator = promotion.key, "promoted new root");
        Ok(())
    }
}
