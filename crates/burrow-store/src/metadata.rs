//! Metadata entries: one 48-byte record per key inside a node block.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::ITEM_SIZE;
use crate::key::KeyHash;

/// Describes one key→blob mapping.
///
/// Layout (48 bytes, little-endian):
/// - key: 16 bytes (hash, high word first)
/// - offset: 8 bytes (i64, absolute offset of the blob record)
/// - size: 8 bytes (high 16 bits key length, low 48 bits payload length)
/// - tstamp: 4 bytes (u32 UNIX seconds)
/// - crc32: 4 bytes (IEEE CRC32 of the payload)
/// - flag: 8 bytes (user tag)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub(crate) key: KeyHash,
    pub(crate) offset: i64,
    size: u64,
    pub(crate) tstamp: u32,
    pub(crate) crc32: u32,
    pub(crate) flag: u64,
}

impl Metadata {
    /// Creates a metadata entry for a freshly appended blob.
    pub(crate) fn new(
        key: KeyHash,
        offset: i64,
        key_len: u16,
        payload_len: u64,
        crc32: u32,
    ) -> Self {
        debug_assert!(offset > 0);
        debug_assert!(payload_len <= crate::constants::MAX_PAYLOAD_LEN);
        Self {
            key,
            offset,
            size: ((key_len as u64) << 48) | payload_len,
            tstamp: unix_now(),
            crc32,
            flag: 0,
        }
    }

    /// The key hash.
    pub fn key(&self) -> KeyHash {
        self.key
    }

    /// Absolute file offset of the blob record.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Length of the key text in bytes.
    pub fn key_len(&self) -> u16 {
        (self.size >> 48) as u16
    }

    /// Length of the payload in bytes.
    pub fn payload_len(&self) -> u64 {
        self.size & crate::constants::MAX_PAYLOAD_LEN
    }

    /// UNIX timestamp of the insertion.
    pub fn created_at(&self) -> u32 {
        self.tstamp
    }

    /// IEEE CRC32 of the payload bytes.
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// The 64-bit user flag.
    pub fn flag(&self) -> u64 {
        self.flag
    }

    /// Serializes the entry into `buf`.
    pub(crate) fn write_to(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= ITEM_SIZE);
        buf[0..16].copy_from_slice(&self.key.to_bytes());
        buf[16..24].copy_from_slice(&self.offset.to_le_bytes());
        buf[24..32].copy_from_slice(&self.size.to_le_bytes());
        buf[32..36].copy_from_slice(&self.tstamp.to_le_bytes());
        buf[36..40].copy_from_slice(&self.crc32.to_le_bytes());
        buf[40..48].copy_from_slice(&self.flag.to_le_bytes());
    }

    /// An all-zero entry used to fill unused item slots.
    pub(crate) fn zeroed() -> Self {
        Metadata::read_from(&[0u8; ITEM_SIZE])
    }

    /// Deserializes an entry from `buf`.
    pub(crate) fn read_from(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= ITEM_SIZE);
        Self {
            key: KeyHash::from_bytes(&buf[0..16]),
            offset: i64::from_le_bytes(buf[16..24].try_into().unwrap()),
            size: u64::from_le_bytes(buf[24..32].try_into().unwrap()),
            tstamp: u32::from_le_bytes(buf[32..36].try_into().unwrap()),
            crc32: u32::from_le_bytes(buf[36..40].try_into().unwrap()),
            flag: u64::from_le_bytes(buf[40..48].try_into().unwrap()),
        }
    }
}

pub(crate) fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Metadata {
        let mut m = Metadata::new(KeyHash::of("sample-key"), 4096, 10, 1234, 0xdeadbeef);
        m.flag = 77;
        m
    }

    #[test]
    fn test_size_packing() {
        let m = Metadata::new(KeyHash::of("k"), 100, 1, 0x0000_1234_5678_9abc, 0);
        assert_eq!(m.key_len(), 1);
        assert_eq!(m.payload_len(), 0x0000_1234_5678_9abc);
    }

    #[test]
    fn test_size_packing_extremes() {
        let m = Metadata::new(KeyHash::of("k"), 1, u16::MAX, crate::constants::MAX_PAYLOAD_LEN, 0);
        assert_eq!(m.key_len(), u16::MAX);
        assert_eq!(m.payload_len(), crate::constants::MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let m = sample();
        let mut buf = [0u8; ITEM_SIZE];
        m.write_to(&mut buf);
        let back = Metadata::read_from(&buf);
        assert_eq!(back, m);
        assert_eq!(back.flag(), 77);
        assert_eq!(back.crc32(), 0xdeadbeef);
    }

    #[test]
    fn test_serialized_key_leads() {
        let m = sample();
        let mut buf = [0u8; ITEM_SIZE];
        m.write_to(&mut buf);
        assert_eq!(&buf[0..16], &m.key().to_bytes());
    }

    #[test]
    fn test_timestamp_populated() {
        let m = Metadata::new(KeyHash::of("t"), 1, 1, 0, 0);
        assert!(m.created_at() > 1_600_000_000);
    }
}
