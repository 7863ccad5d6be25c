//! Error types for BurrowDB.

use thiserror::Error;

/// Result type alias using BurrowError.
pub type Result<T> = std::result::Result<T, BurrowError>;

/// Errors that can occur in BurrowDB operations.
#[derive(Debug, Error)]
pub enum BurrowError {
    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the expected magic bytes, or a node
    /// image loaded from disk does not.
    #[error("wrong magic code")]
    WrongMagic,

    /// The file was produced on a host with a different native endianness.
    #[error("endianness mismatch")]
    Endianness,

    /// The file violates a structural invariant (header checksum, root
    /// offset out of bounds, ...).
    #[error("corrupted store: {0}")]
    Corrupted(String),

    /// The key is not present in the store.
    #[error("key not found")]
    KeyNotFound,

    /// The key is already present; BurrowDB never overwrites.
    #[error("key already exists")]
    KeyExists,

    /// The key exceeds the 65535-byte limit.
    #[error("key too long: {len} bytes (max 65535)")]
    KeyTooLong { len: usize },

    /// A pending snapshot was found at open time but could not be written
    /// back into the store.
    #[error("snapshot recovery failed: {0}")]
    SnapshotRecoveryFailed(String),

    /// Invalid store configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O failure inside the commit critical region. The store is
    /// unusable for the rest of the process; `snapshot` holds the master
    /// snapshot so an external tool can replay it into a salvaged file.
    #[error("fatal store error: {reason}")]
    Fatal { reason: String, snapshot: Vec<u8> },
}

impl BurrowError {
    /// True for errors that poison the store for the rest of the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BurrowError::Fatal { .. })
    }
}
