//! Shared node header and node type tag.
//!
//! Every tree page (page 1 and above) starts with a [`NodeHeader`]. The
//! leading type byte decides whether the rest of the page is read as an
//! internal node or a leaf.

/// Type of tree node stored in a page.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Internal (routing) node.
    Internal = 0,
    /// Leaf node holding key/value entries.
    Leaf = 1,
}

impl NodeType {
    /// Convert from the on-disk tag byte, returning `None` for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NodeType::Internal),
            1 => Some(NodeType::Leaf),
            _ => None,
        }
    }
}

/// Metadata stored at the beginning of every node page.
///
/// # Layout (12 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     node_type (raw tag byte)
/// 1       3     padding (zero)
/// 4       4     num_keys (little-endian)
/// 8       4     reserved (zero)
/// ```
///
/// The raw tag is kept as read; callers check it with [`NodeHeader::node_type`]
/// before trusting the rest of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    /// Raw type tag byte.
    pub tag: u8,
    /// Number of valid keys in the node.
    pub num_keys: u32,
    /// Reserved field, written as zero.
    pub reserved: u32,
}

impl NodeHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 12;

    pub const OFFSET_TYPE: usize = 0;
    pub const OFFSET_NUM_KEYS: usize = 4;
    pub const OFFSET_RESERVED: usize = 8;

    /// Create a header for a node of the given type.
    pub fn new(node_type: NodeType, num_keys: u32) -> Self {
        Self {
            tag: node_type as u8,
            num_keys,
            reserved: 0,
        }
    }

    /// Decoded node type, or `None` if the tag byte is unknown.
    pub fn node_type(&self) -> Option<NodeType> {
        NodeType::from_u8(self.tag)
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < NodeHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for NodeHeader");

        let word =
            |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        Self {
            tag: data[Self::OFFSET_TYPE],
            num_keys: word(Self::OFFSET_NUM_KEYS),
            reserved: word(Self::OFFSET_RESERVED),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// Padding bytes are zeroed.
    ///
    /// # Panics
    /// Panics if `data.len() < NodeHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for NodeHeader");

        data[Self::OFFSET_TYPE] = self.tag;
        data[1..Self::OFFSET_NUM_KEYS].fill(0);
        data[Self::OFFSET_NUM_KEYS..Self::OFFSET_NUM_KEYS + 4]
            .copy_from_slice(&self.num_keys.to_le_bytes());
        data[Self::OFFSET_RESERVED..Self::OFFSET_RESERVED + 4]
            .copy_from_slice(&self.reserved.to_le_bytes());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_from_u8() {
        assert_eq!(NodeType::from_u8(0), Some(NodeType::Internal));
        assert_eq!(NodeType::from_u8(1), Some(NodeType::Leaf));
        assert_eq!(NodeType::from_u8(2), None);
        assert_eq!(NodeType::from_u8(255), None);
    }

    #[test]
    fn test_node_header_byte_layout() {
        let header = NodeHeader::new(NodeType::Leaf, 0x0403_0201);

        let mut buffer = [0xAAu8; NodeHeader::SIZE];
        header.write_to(&mut buffer);

        assert_eq!(buffer[0], 1); // NodeType::Leaf
        assert_eq!(&buffer[1..4], &[0, 0, 0]); // padding
        assert_eq!(&buffer[4..8], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&buffer[8..12], &[0, 0, 0, 0]); // reserved
    }

    #[test]
    fn test_node_header_roundtrip() {
        let original = NodeHeader::new(NodeType::Internal, 128);

        let mut buffer = [0u8; NodeHeader::SIZE];
        original.write_to(&mut buffer);

        let recovered = NodeHeader::from_bytes(&buffer);
        assert_eq!(original, recovered);
        assert_eq!(recovered.node_type(), Some(NodeType::Internal));
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let mut buffer = [0u8; NodeHeader::SIZE];
        buffer[0] = 7;
        let header = NodeHeader::from_bytes(&buffer);
        assert_eq!(header.tag, 7);
        assert_eq!(header.node_type(), None);
    }
}
