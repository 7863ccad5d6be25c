//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BurrowError, Result};

/// Granularity of the mapped prefix and of node slots inside it.
pub const MMAP_ALIGN: usize = 4096;

/// Default size of the memory-mapped prefix (4 MiB).
pub const DEFAULT_MMAP_SIZE: usize = 4 * 1024 * 1024;

/// Default number of pooled read-only file handles.
pub const DEFAULT_MAX_FDS: usize = 4;

/// Options for opening a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Size of the memory-mapped prefix in bytes. Must be a multiple of
    /// 4096, at least 4096 and below 2 GiB. Only consulted at creation;
    /// an existing file keeps the geometry it was created with.
    pub mmap_size: usize,
    /// Initial file size in bytes. Must be a multiple of 4096 and at least
    /// `mmap_size`. The file is pre-extended with zeros to this length at
    /// creation.
    pub init_size: usize,
    /// Number of read-only file handles kept in the reader pool.
    pub max_fds: usize,
    /// Recreate the file even when one already exists.
    pub force_create: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            mmap_size: DEFAULT_MMAP_SIZE,
            init_size: DEFAULT_MMAP_SIZE,
            max_fds: DEFAULT_MAX_FDS,
            force_create: false,
        }
    }
}

impl StoreOptions {
    /// Checks the option invariants.
    pub fn validate(&self) -> Result<()> {
        if self.mmap_size < MMAP_ALIGN {
            return Err(BurrowError::Config(format!(
                "mmap_size {} below minimum {}",
                self.mmap_size, MMAP_ALIGN
            )));
        }
        if self.mmap_size % MMAP_ALIGN != 0 {
            return Err(BurrowError::Config(format!(
                "mmap_size {} is not a multiple of {}",
                self.mmap_size, MMAP_ALIGN
            )));
        }
        if self.mmap_size >= 2 * 1024 * 1024 * 1024 {
            return Err(BurrowError::Config(format!(
                "mmap_size {} must be below 2 GiB",
                self.mmap_size
            )));
        }
        if self.init_size % MMAP_ALIGN != 0 {
            return Err(BurrowError::Config(format!(
                "init_size {} is not a multiple of {}",
                self.init_size, MMAP_ALIGN
            )));
        }
        if self.init_size < self.mmap_size {
            return Err(BurrowError::Config(format!(
                "init_size {} below mmap_size {}",
                self.init_size, self.mmap_size
            )));
        }
        if self.max_fds == 0 {
            return Err(BurrowError::Config("max_fds must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let opts = StoreOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.mmap_size, DEFAULT_MMAP_SIZE);
        assert_eq!(opts.init_size, DEFAULT_MMAP_SIZE);
        assert_eq!(opts.max_fds, DEFAULT_MAX_FDS);
        assert!(!opts.force_create);
    }

    #[test]
    fn test_mmap_size_too_small() {
        let opts = StoreOptions {
            mmap_size: 1024,
            init_size: 4096,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(BurrowError::Config(_))));
    }

    #[test]
    fn test_mmap_size_unaligned() {
        let opts = StoreOptions {
            mmap_size: 4096 + 512,
            init_size: 8192,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(BurrowError::Config(_))));
    }

    #[test]
    fn test_mmap_size_too_large() {
        let opts = StoreOptions {
            mmap_size: 2 * 1024 * 1024 * 1024,
            init_size: 2 * 1024 * 1024 * 1024,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(BurrowError::Config(_))));
    }

    #[test]
    fn test_init_size_below_mmap_size() {
        let opts = StoreOptions {
            mmap_size: 8192,
            init_size: 4096,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(BurrowError::Config(_))));
    }

    #[test]
    fn test_zero_max_fds() {
        let opts = StoreOptions {
            max_fds: 0,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(BurrowError::Config(_))));
    }

    #[test]
    fn test_minimal_valid_geometry() {
        let opts = StoreOptions {
            mmap_size: 4096,
            init_size: 4096,
            max_fds: 1,
            force_create: false,
        };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_serde_roundtrip() {
        let original = StoreOptions::default();
        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: StoreOptions = serde_json::from_str(&serialized).unwrap();
        assert_eq!(original.mmap_size, deserialized.mmap_size);
        assert_eq!(original.init_size, deserialized.init_size);
        assert_eq!(original.max_fds, deserialized.max_fds);
    }
}
