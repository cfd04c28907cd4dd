//! Root-to-leaf descent and typed page access.

use crate::common::config::MAX_TREE_HEIGHT;
use crate::common::{Error, Key, PageId, Result};
use crate::index::btree::node::{InternalNode, LeafNode, Node};
use crate::index::btree::BPlusTree;

impl BPlusTree {
    /// Descend from the root to the leaf whose key range covers `key`.
    ///
    /// When `path` is given it is cleared and filled with every page visited,
    /// root first and leaf last.
    pub(super) fn find_leaf(
        &mut self,
        key: Key,
        mut path: Option<&mut Vec<PageId>>,
    ) -> Result<(PageId, LeafNode)> {
        if let Some(path) = path.as_deref_mut() {
            path.clear();
        }

        let mut page_id = self.store.root_page();
        let mut depth = 0;
        loop {
            depth += 1;
            self.check_depth(depth)?;
            if let Some(path) = path.as_deref_mut() {
                path.push(page_id);
            }

            match self.read_node(page_id)? {
                Node::Leaf(leaf) => return Ok((page_id, leaf)),
                Node::Internal(node) => page_id = node.child_for(key),
            }
        }
    }

    /// Page id of the leaf that would hold `key`.
    pub fn find_leaf_page(&mut self, key: Key) -> Result<PageId> {
        self.store.ensure_operational()?;
        self.find_leaf(key, None).map(|(page_id, _)| page_id)
    }

    pub(super) fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > MAX_TREE_HEIGHT {
            return Err(Error::corruption(format!(
                "descent from {} exceeded {} levels",
                self.store.root_page(),
                MAX_TREE_HEIGHT
            )));
        }
        Ok(())
    }

    pub(super) fn read_node(&mut self, page_id: PageId) -> Result<Node> {
        let page = self.store.read_page(page_id)?;
        Node::decode(page_id, &page)
    }

    pub(super) fn read_internal(&mut self, page_id: PageId) -> Result<InternalNode> {
        let page = self.store.read_page(page_id)?;
        InternalNode::decode(page_id, &page)
    }

    pub(super) fn write_internal(&mut self, page_id: PageId, node: &InternalNode) -> Result<()> {
        self.store.write_page(page_id, &node.encode())
    }

    pub(super) fn write_leaf(&mut self, page_id: PageId, leaf: &LeafNode) -> Result<()> {
        self.store.write_page(page_id, &leaf.encode())
    }
}

#[cfg(test)]
mod tests {
    use crate::common::{PageId, TreeOptions, Value};
    use crate::index::btree::BPlusTree;
    use tempfile::tempdir;

    #[test]
    fn test_path_runs_root_to_leaf() {
        let dir = tempdir().unwrap();
        let mut tree = BPlusTree::open_with_options(
            dir.path().join("t.idx"),
            TreeOptions::default().sync_writes(false),
        )
        .unwrap();

        let mut path = vec![PageId::new(77)];
        let (leaf_page, _) = tree.find_leaf(5, Some(&mut path)).unwrap();
        assert_eq!(path, vec![PageId::FIRST_ROOT]);
        assert_eq!(leaf_page, PageId::FIRST_ROOT);

        for k in 0..100 {
            tree.write_data(k, &Value::ZERO).unwrap();
        }

        let (leaf_page, leaf) = tree.find_leaf(50, Some(&mut path)).unwrap();
        assert_eq!(path.first(), Some(&tree.root_page_id()));
        assert_eq!(path.last(), Some(&leaf_page));
        assert_eq!(path.len(), tree.height().unwrap());
        assert!(leaf.get(50).is_some());
        assert_eq!(tree.find_leaf_page(50).unwrap(), leaf_page);
    }

    #[test]
    fn test_separator_routes_right() {
        let dir = tempdir().unwrap();
        let mut tree = BPlusTree::open_with_options(
            dir.path().join("t.idx"),
            TreeOptions::default().sync_writes(false),
        )
        .unwrap();
        for k in 1..=31 {
            tree.write_data(k, &Value::ZERO).unwrap();
        }

        // 31 keys split 15/16: the separator is 16, the right leaf's first key.
        let left = tree.find_leaf_page(15).unwrap();
        let right = tree.find_leaf_page(16).unwrap();
        assert_ne!(left, right);
        assert_eq!(tree.find_leaf_page(i32::MIN).unwrap(), left);
        assert_eq!(tree.find_leaf_page(i32::MAX).unwrap(), right);
    }
}
