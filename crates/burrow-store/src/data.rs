//! Streaming read handles.

use std::fs::File;
use std::io::{self, Read};
use std::sync::Arc;

use burrow_common::Result;

use crate::metadata::Metadata;
use crate::pool::FdPool;

/// A self-contained handle streaming one blob's payload.
///
/// The handle owns a pooled file descriptor positioned at the start of the
/// payload; it is returned to the pool on drop. The payload CRC is verified
/// together with the final byte: the last successful `read` call fails with
/// `InvalidData` when the stored checksum disagrees.
#[derive(Debug)]
pub struct Data {
    meta: Metadata,
    file: Option<File>,
    pool: Arc<FdPool>,
    crc: crc32fast::Hasher,
    remaining: u64,
}

impl Data {
    pub(crate) fn new(meta: Metadata, file: File, pool: Arc<FdPool>) -> Self {
        let remaining = meta.payload_len();
        Self {
            meta,
            file: Some(file),
            pool,
            crc: crc32fast::Hasher::new(),
            remaining,
        }
    }

    /// The metadata entry backing this handle.
    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    /// The user flag stored with the key.
    pub fn flag(&self) -> u64 {
        self.meta.flag()
    }

    /// Payload length in bytes.
    pub fn len(&self) -> u64 {
        self.meta.payload_len()
    }

    /// True for empty payloads.
    pub fn is_empty(&self) -> bool {
        self.meta.payload_len() == 0
    }

    /// Reads the whole payload and closes the handle.
    pub fn read_all(mut self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.remaining as usize);
        self.read_to_end(&mut out)?;
        Ok(out)
    }

    /// Returns the handle to the pool. Dropping does the same.
    pub fn close(self) {}
}

impl Read for Data {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let file = self
            .file
            .as_mut()
            .expect("file present until dropped");

        let want = buf.len().min(self.remaining as usize);
        let n = file.read(&mut buf[..want])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("blob truncated with {} bytes remaining", self.remaining),
            ));
        }

        self.crc.update(&buf[..n]);
        self.remaining -= n as u64;
        if self.remaining == 0 {
            let computed = self.crc.clone().finalize();
            if computed != self.meta.crc32() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "payload crc32 mismatch: stored {:#010x}, computed {computed:#010x}",
                        self.meta.crc32()
                    ),
                ));
            }
        }
        Ok(n)
    }
}

impl Drop for Data {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            self.pool.release(file);
        }
    }
}
