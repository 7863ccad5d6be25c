//! 128-bit key hashing.
//!
//! The key space is ordered by the numeric value of the 128-bit hash, high
//! word first. Keys of up to 8 bytes are embedded verbatim in the high word
//! so they can be reconstructed from the hash alone; longer keys hash with
//! FNV-1a 128 and keep their text next to the blob.

use crate::fnv::{fnv128a, fnv64a};

/// A 128-bit key hash with the on-disk total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyHash(u128);

impl KeyHash {
    /// Hashes a key string.
    pub fn of(key: &str) -> Self {
        let bytes = key.as_bytes();
        if bytes.len() <= 8 {
            let mut padded = [0u8; 8];
            padded[..bytes.len()].copy_from_slice(bytes);
            let hi = u64::from_le_bytes(padded);
            let lo = fnv64a(bytes);
            KeyHash(((hi as u128) << 64) | lo as u128)
        } else {
            KeyHash(fnv128a(bytes))
        }
    }

    /// High 64 bits.
    pub fn hi(&self) -> u64 {
        (self.0 >> 64) as u64
    }

    /// Low 64 bits.
    pub fn lo(&self) -> u64 {
        self.0 as u64
    }

    /// On-disk form: high word first, both words little-endian.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.hi().to_le_bytes());
        out[8..].copy_from_slice(&self.lo().to_le_bytes());
        out
    }

    /// Parses the on-disk form.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let hi = u64::from_le_bytes(bytes[..8].try_into().unwrap());
        let lo = u64::from_le_bytes(bytes[8..16].try_into().unwrap());
        KeyHash(((hi as u128) << 64) | lo as u128)
    }

    /// Reconstructs the text of a short key (`len <= 8`) from the hash.
    /// Returns `None` when the embedded bytes are not valid UTF-8, which
    /// only happens on a corrupted file.
    pub fn short_key_text(&self, len: usize) -> Option<String> {
        debug_assert!(len <= 8);
        let bytes = self.hi().to_le_bytes();
        std::str::from_utf8(&bytes[..len]).ok().map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(KeyHash::of("hello"), KeyHash::of("hello"));
        assert_eq!(KeyHash::of("a-much-longer-key"), KeyHash::of("a-much-longer-key"));
    }

    #[test]
    fn test_distinct_keys_distinct_hashes() {
        assert_ne!(KeyHash::of("a"), KeyHash::of("b"));
        assert_ne!(KeyHash::of("0"), KeyHash::of("00"));
        assert_ne!(KeyHash::of("key-number-1"), KeyHash::of("key-number-2"));
    }

    #[test]
    fn test_short_key_roundtrip() {
        for key in ["a", "zz", "137393", "abcdefgh", "0", "1023"] {
            let hash = KeyHash::of(key);
            assert_eq!(hash.short_key_text(key.len()).as_deref(), Some(key));
        }
    }

    #[test]
    fn test_bytes_roundtrip() {
        for key in ["x", "hello world, this is long"] {
            let hash = KeyHash::of(key);
            assert_eq!(KeyHash::from_bytes(&hash.to_bytes()), hash);
        }
    }

    #[test]
    fn test_first_persisted_bytes_are_short_key_text() {
        let hash = KeyHash::of("cat");
        let bytes = hash.to_bytes();
        assert_eq!(&bytes[..3], b"cat");
        assert_eq!(&bytes[3..8], &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_order_matches_persisted_comparison() {
        // The in-memory order must agree with comparing (hi, lo) pairs.
        let a = KeyHash::of("aaaa");
        let b = KeyHash::of("zzzz");
        let ord = a.cmp(&b);
        let pair_ord = (a.hi(), a.lo()).cmp(&(b.hi(), b.lo()));
        assert_eq!(ord, pair_ord);
    }
}
