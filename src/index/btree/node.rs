//! Node codec - internal and leaf node layouts.
//!
//! # Internal node page
//! ```text
//! Offset  Size        Field
//! ------  ----------  -----
//! 0       12          NodeHeader (tag 0)
//! 12      4 × 128     keys (i32)
//! 524     4 × 129     children (u32 page ids)
//! ```
//!
//! # Leaf node page
//! ```text
//! Offset  Size        Field
//! ------  ----------  -----
//! 0       12          NodeHeader (tag 1)
//! 12      4           next_leaf (u32 page id, 0xFFFFFFFF at the end)
//! 16      4 × 30      keys (i32)
//! 136     100 × 30    values
//! ```
//!
//! Slots past `num_keys` are written as zero. Decoding rejects any page a
//! valid tree could not have produced.

use crate::common::config::{INTERNAL_MAX_KEYS, LEAF_MAX_KEYS, PAGE_SIZE, VALUE_SIZE};
use crate::common::{Error, Key, PageId, Result, Value};
use crate::storage::page::{NodeHeader, NodeType, Page};

const INTERNAL_KEYS_OFFSET: usize = NodeHeader::SIZE;
const INTERNAL_CHILDREN_OFFSET: usize = INTERNAL_KEYS_OFFSET + 4 * INTERNAL_MAX_KEYS;
const INTERNAL_END: usize = INTERNAL_CHILDREN_OFFSET + 4 * (INTERNAL_MAX_KEYS + 1);

const LEAF_NEXT_OFFSET: usize = NodeHeader::SIZE;
const LEAF_KEYS_OFFSET: usize = LEAF_NEXT_OFFSET + 4;
const LEAF_VALUES_OFFSET: usize = LEAF_KEYS_OFFSET + 4 * LEAF_MAX_KEYS;
const LEAF_END: usize = LEAF_VALUES_OFFSET + VALUE_SIZE * LEAF_MAX_KEYS;

const _: () = assert!(INTERNAL_END <= PAGE_SIZE);
const _: () = assert!(LEAF_END <= PAGE_SIZE);

/// A decoded tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Internal(InternalNode),
    Leaf(LeafNode),
}

impl Node {
    /// Decode a node page, checking the type tag first.
    ///
    /// `page_id` is only used in error messages.
    pub fn decode(page_id: PageId, page: &Page) -> Result<Node> {
        let header = page.node_header();
        match header.node_type() {
            Some(NodeType::Internal) => {
                InternalNode::decode_body(page_id, page, header).map(Node::Internal)
            }
            Some(NodeType::Leaf) => LeafNode::decode_body(page_id, page, header).map(Node::Leaf),
            None => Err(Error::corruption(format!(
                "{} has unknown node tag {}",
                page_id, header.tag
            ))),
        }
    }
}

fn check_ascending(page_id: PageId, keys: &[Key]) -> Result<()> {
    if keys.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        Err(Error::corruption(format!("{} keys are not strictly ascending", page_id)))
    }
}

// ============================================================================
// Internal node
// ============================================================================

/// Routing node: `keys.len()` separators and `keys.len() + 1` children.
///
/// `children[i]` covers every key `k` with `keys[i-1] <= k < keys[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode {
    pub keys: Vec<Key>,
    pub children: Vec<PageId>,
}

impl InternalNode {
    /// A root with exactly two children separated by `key`.
    pub fn new_root(left: PageId, key: Key, right: PageId) -> Self {
        Self {
            keys: vec![key],
            children: vec![left, right],
        }
    }

    /// Read a page that must hold an internal node.
    pub fn decode(page_id: PageId, page: &Page) -> Result<Self> {
        match Node::decode(page_id, page)? {
            Node::Internal(node) => Ok(node),
            Node::Leaf(_) => Err(Error::corruption(format!(
                "{} is a leaf where an internal node was expected",
                page_id
            ))),
        }
    }

    fn decode_body(page_id: PageId, page: &Page, header: NodeHeader) -> Result<Self> {
        let n = header.num_keys as usize;
        if n == 0 || n > INTERNAL_MAX_KEYS {
            return Err(Error::corruption(format!(
                "{} is an internal node with {} keys",
                page_id, n
            )));
        }

        let keys: Vec<Key> = (0..n)
            .map(|i| page.get_i32(INTERNAL_KEYS_OFFSET + 4 * i))
            .collect();
        check_ascending(page_id, &keys)?;

        let children: Vec<PageId> = (0..=n)
            .map(|i| PageId::new(page.get_u32(INTERNAL_CHILDREN_OFFSET + 4 * i)))
            .collect();
        if let Some(bad) = children.iter().find(|c| c.is_header() || !c.is_valid()) {
            return Err(Error::corruption(format!(
                "{} has child pointer {}",
                page_id, bad
            )));
        }

        Ok(Self { keys, children })
    }

    /// Encode into a fresh page.
    ///
    /// # Panics
    /// Panics if the node is over capacity or the child count is not
    /// `keys.len() + 1`; both are bugs in the caller.
    pub fn encode(&self) -> Page {
        assert!(self.keys.len() <= INTERNAL_MAX_KEYS, "internal node over capacity");
        assert_eq!(self.children.len(), self.keys.len() + 1, "child count mismatch");

        let mut page = Page::new();
        page.set_node_header(&NodeHeader::new(NodeType::Internal, self.keys.len() as u32));
        for (i, &key) in self.keys.iter().enumerate() {
            page.put_i32(INTERNAL_KEYS_OFFSET + 4 * i, key);
        }
        for (i, child) in self.children.iter().enumerate() {
            page.put_u32(INTERNAL_CHILDREN_OFFSET + 4 * i, child.0);
        }
        page
    }

    /// Index of the child to descend into for `key`.
    ///
    /// The smallest `i` with `key < keys[i]`, or the last child if `key` is
    /// at or above every separator.
    #[inline]
    pub fn child_index(&self, key: Key) -> usize {
        self.keys.partition_point(|&k| k <= key)
    }

    #[inline]
    pub fn child_for(&self, key: Key) -> PageId {
        self.children[self.child_index(key)]
    }

    /// Position of `child` among this node's children.
    pub fn position_of(&self, child: PageId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() >= INTERNAL_MAX_KEYS
    }

    /// Insert separator `key` with `right` as the child just after
    /// `children[left_index]`.
    pub fn insert_after(&mut self, left_index: usize, key: Key, right: PageId) {
        self.keys.insert(left_index, key);
        self.children.insert(left_index + 1, right);
    }

    /// Split an overfull node around its middle key.
    ///
    /// Keeps `keys[..mid]` here, moves `keys[mid + 1..]` into the returned
    /// right node and returns `keys[mid]`, which belongs to neither half.
    pub fn split(&mut self) -> (Key, InternalNode) {
        let mid = self.keys.len() / 2;
        let mid_key = self.keys[mid];
        let right_keys = self.keys.split_off(mid + 1);
        let right_children = self.children.split_off(mid + 1);
        self.keys.truncate(mid);

        (
            mid_key,
            InternalNode {
                keys: right_keys,
                children: right_children,
            },
        )
    }
}

// ============================================================================
// Leaf node
// ============================================================================

/// Leaf: sorted `(key, value)` entries and the link to the next leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub next_leaf: PageId,
    pub keys: Vec<Key>,
    pub values: Vec<Value>,
}

impl LeafNode {
    /// An empty leaf at the end of the chain.
    pub fn empty() -> Self {
        Self {
            next_leaf: PageId::INVALID,
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Read a page that must hold a leaf.
    pub fn decode(page_id: PageId, page: &Page) -> Result<Self> {
        match Node::decode(page_id, page)? {
            Node::Leaf(node) => Ok(node),
            Node::Internal(_) => Err(Error::corruption(format!(
                "{} is an internal node where a leaf was expected",
                page_id
            ))),
        }
    }

    fn decode_body(page_id: PageId, page: &Page, header: NodeHeader) -> Result<Self> {
        let n = header.num_keys as usize;
        if n > LEAF_MAX_KEYS {
            return Err(Error::corruption(format!(
                "{} is a leaf with {} keys",
                page_id, n
            )));
        }

        let next_leaf = PageId::new(page.get_u32(LEAF_NEXT_OFFSET));
        if next_leaf.is_header() {
            return Err(Error::corruption(format!(
                "{} links to the header page",
                page_id
            )));
        }

        let keys: Vec<Key> = (0..n)
            .map(|i| page.get_i32(LEAF_KEYS_OFFSET + 4 * i))
            .collect();
        check_ascending(page_id, &keys)?;

        let values = (0..n)
            .map(|i| {
                let mut raw = [0u8; VALUE_SIZE];
                raw.copy_from_slice(page.bytes(LEAF_VALUES_OFFSET + VALUE_SIZE * i, VALUE_SIZE));
                Value::new(raw)
            })
            .collect();

        Ok(Self {
            next_leaf,
            keys,
            values,
        })
    }

    /// Encode into a fresh page.
    ///
    /// # Panics
    /// Panics if the leaf is over capacity or keys and values differ in
    /// length; both are bugs in the caller.
    pub fn encode(&self) -> Page {
        assert!(self.keys.len() <= LEAF_MAX_KEYS, "leaf over capacity");
        assert_eq!(self.keys.len(), self.values.len(), "key/value count mismatch");

        let mut page = Page::new();
        page.set_node_header(&NodeHeader::new(NodeType::Leaf, self.keys.len() as u32));
        page.put_u32(LEAF_NEXT_OFFSET, self.next_leaf.0);
        for (i, (&key, value)) in self.keys.iter().zip(&self.values).enumerate() {
            page.put_i32(LEAF_KEYS_OFFSET + 4 * i, key);
            page.put_bytes(LEAF_VALUES_OFFSET + VALUE_SIZE * i, value.as_bytes());
        }
        page
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() >= LEAF_MAX_KEYS
    }

    /// Binary search: `Ok(index)` if present, `Err(insertion point)` if not.
    #[inline]
    pub fn search(&self, key: Key) -> std::result::Result<usize, usize> {
        self.keys.binary_search(&key)
    }

    pub fn get(&self, key: Key) -> Option<&Value> {
        self.search(key).ok().map(|i| &self.values[i])
    }

    pub fn insert_at(&mut self, index: usize, key: Key, value: Value) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub fn remove_at(&mut self, index: usize) -> (Key, Value) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Split an overfull leaf in two.
    ///
    /// The left half keeps `len / 2` entries; the rest move to the returned
    /// right leaf, which inherits this leaf's `next_leaf`. The caller links
    /// this leaf to the right leaf's page once it has one. The right leaf's
    /// first key is the separator to promote; it stays in the leaf.
    pub fn split(&mut self) -> LeafNode {
        let split = self.keys.len() / 2;
        LeafNode {
            next_leaf: self.next_leaf,
            keys: self.keys.split_off(split),
            values: self.values.split_off(split),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(n: i32) -> Value {
        Value::from_str_padded(&format!("v{}", n))
    }

    fn full_leaf() -> LeafNode {
        LeafNode {
            next_leaf: PageId::new(9),
            keys: (0..LEAF_MAX_KEYS as i32).map(|k| k * 2).collect(),
            values: (0..LEAF_MAX_KEYS as i32).map(|k| value(k * 2)).collect(),
        }
    }

    fn full_internal() -> InternalNode {
        InternalNode {
            keys: (0..INTERNAL_MAX_KEYS as i32).map(|k| k * 10 - 500).collect(),
            children: (0..=INTERNAL_MAX_KEYS as u32).map(|c| PageId::new(c + 1)).collect(),
        }
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(INTERNAL_CHILDREN_OFFSET, 524);
        assert_eq!(INTERNAL_END, 1040);
        assert_eq!(LEAF_VALUES_OFFSET, 136);
        assert_eq!(LEAF_END, 3136);
    }

    #[test]
    fn test_leaf_roundtrip_at_capacity() {
        let leaf = full_leaf();
        let page = leaf.encode();
        assert_eq!(LeafNode::decode(PageId::new(3), &page).unwrap(), leaf);
    }

    #[test]
    fn test_internal_roundtrip_at_capacity() {
        let node = full_internal();
        let page = node.encode();
        assert_eq!(InternalNode::decode(PageId::new(3), &page).unwrap(), node);
    }

    #[test]
    fn test_page_roundtrip_is_byte_exact() {
        let page = full_leaf().encode();
        let again = LeafNode::decode(PageId::new(3), &page).unwrap().encode();
        assert_eq!(page.as_slice(), again.as_slice());
    }

    #[test]
    fn test_leaf_byte_layout() {
        let mut leaf = LeafNode::empty();
        leaf.insert_at(0, -1, Value::from_str_padded("x"));
        let page = leaf.encode();
        let bytes = page.as_slice();

        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &[0xFF; 4]);
        assert_eq!(&bytes[16..20], &(-1i32).to_le_bytes());
        assert_eq!(bytes[136], b'x');
    }

    #[test]
    fn test_internal_byte_layout() {
        let node = InternalNode::new_root(PageId::new(1), 42, PageId::new(2));
        let page = node.encode();
        let bytes = page.as_slice();

        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &42i32.to_le_bytes());
        assert_eq!(&bytes[524..528], &1u32.to_le_bytes());
        assert_eq!(&bytes[528..532], &2u32.to_le_bytes());
    }

    #[test]
    fn test_zeroed_page_is_corrupt() {
        let page = Page::new();
        assert!(matches!(
            Node::decode(PageId::new(4), &page),
            Err(Error::Corruption(_))
        ));
    }

    #[test]
    fn test_unknown_tag_is_corrupt() {
        let mut page = LeafNode::empty().encode();
        page.as_mut_slice()[0] = 2;
        assert!(matches!(
            Node::decode(PageId::new(4), &page),
            Err(Error::Corruption(_))
        ));
    }

    #[test]
    fn test_wrong_variant_is_corrupt() {
        let page = LeafNode::empty().encode();
        assert!(InternalNode::decode(PageId::new(1), &page).is_err());

        let page = InternalNode::new_root(PageId::new(1), 5, PageId::new(2)).encode();
        assert!(LeafNode::decode(PageId::new(3), &page).is_err());
    }

    #[test]
    fn test_over_capacity_count_is_corrupt() {
        let mut page = LeafNode::empty().encode();
        page.put_u32(NodeHeader::OFFSET_NUM_KEYS, LEAF_MAX_KEYS as u32 + 1);
        assert!(LeafNode::decode(PageId::new(1), &page).is_err());
    }

    #[test]
    fn test_unsorted_keys_are_corrupt() {
        let mut leaf = full_leaf();
        leaf.keys.swap(0, 1);
        let page = leaf.encode();
        assert!(LeafNode::decode(PageId::new(1), &page).is_err());
    }

    #[test]
    fn test_child_pointing_at_header_is_corrupt() {
        let page = InternalNode::new_root(PageId::HEADER, 5, PageId::new(2)).encode();
        assert!(InternalNode::decode(PageId::new(3), &page).is_err());
    }

    #[test]
    fn test_child_index_upper_bound_routing() {
        let node = InternalNode {
            keys: vec![10, 20, 30],
            children: (1..=4).map(PageId::new).collect(),
        };

        assert_eq!(node.child_index(i32::MIN), 0);
        assert_eq!(node.child_index(9), 0);
        assert_eq!(node.child_index(10), 1);
        assert_eq!(node.child_index(19), 1);
        assert_eq!(node.child_index(20), 2);
        assert_eq!(node.child_index(30), 3);
        assert_eq!(node.child_index(i32::MAX), 3);
        assert_eq!(node.child_for(25), PageId::new(3));
    }

    #[test]
    fn test_leaf_split_copies_boundary_key() {
        let mut leaf = full_leaf();
        let idx = leaf.search(7).unwrap_err();
        leaf.insert_at(idx, 7, value(7));
        assert_eq!(leaf.len(), LEAF_MAX_KEYS + 1);

        let right = leaf.split();

        assert_eq!(leaf.len(), 15);
        assert_eq!(right.len(), 16);
        assert_eq!(right.next_leaf, PageId::new(9));
        assert!(leaf.keys.last().unwrap() < &right.keys[0]);
        assert_eq!(right.get(right.keys[0]), Some(&value(right.keys[0])));
    }

    #[test]
    fn test_internal_split_removes_middle_key() {
        let mut node = full_internal();
        node.insert_after(INTERNAL_MAX_KEYS, 10_000, PageId::new(500));
        assert_eq!(node.keys.len(), INTERNAL_MAX_KEYS + 1);

        let before = node.keys.clone();
        let (mid_key, right) = node.split();

        assert_eq!(mid_key, before[64]);
        assert_eq!(node.keys.len(), 64);
        assert_eq!(right.keys.len(), 64);
        assert_eq!(node.children.len(), 65);
        assert_eq!(right.children.len(), 65);
        assert!(!node.keys.contains(&mid_key));
        assert!(!right.keys.contains(&mid_key));
        assert_eq!(*right.children.last().unwrap(), PageId::new(500));
    }

    #[test]
    fn test_insert_after_places_child_to_the_right() {
        let mut node = InternalNode::new_root(PageId::new(1), 50, PageId::new(2));
        node.insert_after(0, 20, PageId::new(3));

        assert_eq!(node.keys, vec![20, 50]);
        assert_eq!(
            node.children,
            vec![PageId::new(1), PageId::new(3), PageId::new(2)]
        );
        assert_eq!(node.position_of(PageId::new(3)), Some(1));
        assert_eq!(node.position_of(PageId::new(8)), None);
    }
}
