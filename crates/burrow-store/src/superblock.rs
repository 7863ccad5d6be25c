//! The super block: the 72-byte header at offset 0.

use burrow_common::{BurrowError, Result};

use crate::constants::{ENDIAN_TAG, SUPER_BLOCK_SIZE, SUPER_MAGIC};
use crate::fnv::fnv64a;

/// In-memory mirror of the file header.
///
/// Layout (72 bytes, little-endian):
/// - magic "zzz0": 4 bytes
/// - endian: 1 byte (1 = little, 0 = big)
/// - pad: 7 bytes
/// - mmap_size: 4 bytes (i32)
/// - mmap_size_used: 4 bytes (i32, node-slot watermark)
/// - created_at: 4 bytes (u32 UNIX seconds)
/// - size: 8 bytes (i64, total payload bytes accepted)
/// - count: 8 bytes (u64, live keys)
/// - salt: 16 bytes
/// - root_offset: 8 bytes (i64, 0 = empty tree)
/// - super_hash: 8 bytes (FNV-1a 64 of bytes 0..64)
#[derive(Debug, Clone)]
pub(crate) struct SuperBlock {
    pub(crate) mmap_size: i32,
    pub(crate) mmap_size_used: i32,
    pub(crate) created_at: u32,
    pub(crate) size: i64,
    pub(crate) count: u64,
    pub(crate) salt: [u8; 16],
    pub(crate) root_offset: i64,
}

impl SuperBlock {
    /// Serializes the header, computing the trailing hash.
    pub(crate) fn to_bytes(&self) -> [u8; SUPER_BLOCK_SIZE] {
        let mut buf = [0u8; SUPER_BLOCK_SIZE];
        buf[0..4].copy_from_slice(&SUPER_MAGIC);
        buf[4] = ENDIAN_TAG;
        buf[12..16].copy_from_slice(&self.mmap_size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.mmap_size_used.to_le_bytes());
        buf[20..24].copy_from_slice(&self.created_at.to_le_bytes());
        buf[24..32].copy_from_slice(&self.size.to_le_bytes());
        buf[32..40].copy_from_slice(&self.count.to_le_bytes());
        buf[40..56].copy_from_slice(&self.salt);
        buf[56..64].copy_from_slice(&self.root_offset.to_le_bytes());
        let hash = fnv64a(&buf[..SUPER_BLOCK_SIZE - 8]);
        buf[64..72].copy_from_slice(&hash.to_le_bytes());
        buf
    }

    /// Parses and validates a header read from disk.
    pub(crate) fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < SUPER_BLOCK_SIZE {
            return Err(BurrowError::Corrupted(format!(
                "header truncated: {} bytes",
                buf.len()
            )));
        }
        if buf[0..4] != SUPER_MAGIC {
            return Err(BurrowError::WrongMagic);
        }
        if buf[4] != ENDIAN_TAG {
            return Err(BurrowError::Endianness);
        }
        let stored = u64::from_le_bytes(buf[64..72].try_into().unwrap());
        let computed = fnv64a(&buf[..SUPER_BLOCK_SIZE - 8]);
        if stored != computed {
            return Err(BurrowError::Corrupted(format!(
                "header hash mismatch: stored {stored:#x}, computed {computed:#x}"
            )));
        }
        let mut salt = [0u8; 16];
        salt.copy_from_slice(&buf[40..56]);
        Ok(Self {
            mmap_size: i32::from_le_bytes(buf[12..16].try_into().unwrap()),
            mmap_size_used: i32::from_le_bytes(buf[16..20].try_into().unwrap()),
            created_at: u32::from_le_bytes(buf[20..24].try_into().unwrap()),
            size: i64::from_le_bytes(buf[24..32].try_into().unwrap()),
            count: u64::from_le_bytes(buf[32..40].try_into().unwrap()),
            salt,
            root_offset: i64::from_le_bytes(buf[56..64].try_into().unwrap()),
        })
    }
}
