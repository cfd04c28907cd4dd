//! Range scans over the leaf chain.

use std::iter::FusedIterator;

use crate::common::{Error, Key, PageId, Result, Value};
use crate::index::btree::node::LeafNode;
use crate::index::btree::BPlusTree;
use crate::storage::DiskManager;

impl BPlusTree {
    /// Scan keys in `[low, high]` in ascending order.
    ///
    /// Leaves are read one at a time as the iterator advances. The scan stops
    /// at the first key above `high` or at the end of the chain. `low > high`
    /// gives an empty scan.
    pub fn range(&mut self, low: Key, high: Key) -> Result<RangeScan<'_>> {
        self.store.ensure_operational()?;
        if low > high {
            return Ok(RangeScan::new(&mut self.store, None, low, high));
        }

        let (_, leaf) = self.find_leaf(low, None)?;
        Ok(RangeScan::new(&mut self.store, Some(leaf), low, high))
    }

    /// Every entry in the tree, in key order.
    pub fn iter(&mut self) -> Result<RangeScan<'_>> {
        self.range(Key::MIN, Key::MAX)
    }

    /// Collect the values of every key in `[low, high]`, in key order.
    pub fn read_range_data(&mut self, low: Key, high: Key) -> Result<Vec<Value>> {
        self.range(low, high)?
            .map(|entry| entry.map(|(_, value)| value))
            .collect()
    }
}

/// Lazy ascending scan produced by [`BPlusTree::range`].
///
/// Yields `(key, value)` pairs. An error ends the scan.
pub struct RangeScan<'a> {
    store: &'a mut DiskManager,
    leaf: Option<LeafNode>,
    pos: usize,
    high: Key,
    /// Leaves loaded after the first; bounded by the page count.
    hops: u32,
}

impl<'a> RangeScan<'a> {
    fn new(store: &'a mut DiskManager, leaf: Option<LeafNode>, low: Key, high: Key) -> Self {
        let pos = leaf
            .as_ref()
            .map_or(0, |leaf| leaf.keys.partition_point(|&k| k < low));
        Self {
            store,
            leaf,
            pos,
            high,
            hops: 0,
        }
    }

    fn advance_leaf(&mut self, next: PageId) -> Result<()> {
        self.hops += 1;
        if self.hops >= self.store.page_count() {
            return Err(Error::corruption(format!(
                "leaf chain does not terminate (reached {})",
                next
            )));
        }
        let page = self.store.read_page(next)?;
        self.leaf = Some(LeafNode::decode(next, &page)?);
        self.pos = 0;
        Ok(())
    }
}

impl Iterator for RangeScan<'_> {
    type Item = Result<(Key, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf.as_ref()?;

            if self.pos < leaf.len() {
                let key = leaf.keys[self.pos];
                if key > self.high {
                    self.leaf = None;
                    return None;
                }
                let value = leaf.values[self.pos];
                self.pos += 1;
                return Some(Ok((key, value)));
            }

            let next = leaf.next_leaf;
            if !next.is_valid() {
                self.leaf = None;
                return None;
            }
            if let Err(e) = self.advance_leaf(next) {
                self.leaf = None;
                return Some(Err(e));
            }
        }
    }
}

impl FusedIterator for RangeScan<'_> {}
