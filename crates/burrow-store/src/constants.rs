//! On-disk layout constants.

/// Magic bytes opening the super block.
pub const SUPER_MAGIC: [u8; 4] = *b"zzz0";

/// Magic bytes opening every node block.
pub const NODE_MAGIC: [u8; 4] = *b"xxx0";

/// Size of the super block at offset 0.
pub const SUPER_BLOCK_SIZE: usize = 72;

/// Maximum number of items per node.
pub const MAX_ITEMS: usize = 63;

/// Maximum number of children per node.
pub const MAX_CHILDREN: usize = MAX_ITEMS + 1;

/// Size of one metadata entry inside a node.
pub const ITEM_SIZE: usize = 48;

/// Size of a serialized node block: header + items + child offsets.
pub const NODE_BLOCK_SIZE: usize = 16 + MAX_ITEMS * ITEM_SIZE + MAX_CHILDREN * 8;

/// Stride of node slots inside the mapped prefix. One slot per page keeps
/// every prefix-resident node page-aligned.
pub const NODE_SLOT_SIZE: usize = 4096;

/// Reserved region after the super block for the pending-snapshot marker
/// and its embedded body. A single insert normally dirties at most 8 nodes;
/// anything larger spills to the side-car file.
pub const SNAPSHOT_SLOT_SIZE: usize = 4 + SUPER_BLOCK_SIZE + 8 * NODE_BLOCK_SIZE + 16;

/// Offset of the pending-snapshot length field (u32, big-endian).
pub const SNAPSHOT_LEN_OFFSET: usize = SUPER_BLOCK_SIZE;

/// Offset of the embedded snapshot body.
pub const SNAPSHOT_BODY_OFFSET: usize = SUPER_BLOCK_SIZE + 4;

/// Largest snapshot body that fits the embedded slot.
pub const SNAPSHOT_EMBED_MAX: usize = SNAPSHOT_SLOT_SIZE - 4;

/// Chunk size for streaming blob payloads.
pub const COPY_CHUNK: usize = 32 * 1024;

/// Maximum key length in bytes (stored in 16 bits of the size field).
pub const MAX_KEY_LEN: usize = 65535;

/// Maximum payload length in bytes (stored in 48 bits of the size field).
pub const MAX_PAYLOAD_LEN: u64 = (1 << 48) - 1;

/// Host endianness tag persisted in the super block.
#[cfg(target_endian = "little")]
pub const ENDIAN_TAG: u8 = 1;
#[cfg(target_endian = "big")]
pub const ENDIAN_TAG: u8 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_block_size() {
        assert_eq!(NODE_BLOCK_SIZE, 3552);
        assert!(NODE_BLOCK_SIZE <= NODE_SLOT_SIZE);
    }

    #[test]
    fn test_snapshot_slot_size() {
        assert_eq!(SNAPSHOT_SLOT_SIZE, 4 + 72 + 8 * 3552 + 16);
        assert!(SNAPSHOT_SLOT_SIZE < 32 * 1024);
    }

    #[test]
    fn test_size_field_limits() {
        assert_eq!(MAX_KEY_LEN, u16::MAX as usize);
        assert_eq!(MAX_PAYLOAD_LEN, 0x0000_ffff_ffff_ffff);
    }
}
