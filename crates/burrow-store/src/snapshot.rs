//! Master-snapshot encoding and the pending-snapshot slot.
//!
//! A master snapshot is the commit record of one mutation: the
//! post-operation super-block image, the post-operation image of every
//! dirty node, and a trailing FNV-1a 128 seal. Its length is published
//! big-endian at offset 72 before any in-place write happens; recovery
//! replays a sealed snapshot and ignores a torn one.

use std::path::{Path, PathBuf};

use bytes::{BufMut, BytesMut};

use crate::constants::{
    NODE_BLOCK_SIZE, SNAPSHOT_BODY_OFFSET, SNAPSHOT_EMBED_MAX, SNAPSHOT_LEN_OFFSET,
    SUPER_BLOCK_SIZE,
};
use crate::fnv::{digest128_to_bytes, fnv128a};

/// Assembles a master snapshot from the super-block image and the staged
/// node images.
pub(crate) fn encode<'a>(
    sb_image: &[u8; SUPER_BLOCK_SIZE],
    node_images: impl Iterator<Item = &'a [u8; NODE_BLOCK_SIZE]>,
) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_slice(sb_image);
    for image in node_images {
        body.put_slice(&image[..]);
    }
    let digest = fnv128a(&body);
    body.put_slice(&digest128_to_bytes(digest));
    body.to_vec()
}

/// True when `bytes` is a complete, sealed snapshot.
pub(crate) fn validate(bytes: &[u8]) -> bool {
    if bytes.len() < SUPER_BLOCK_SIZE + 16 {
        return false;
    }
    if (bytes.len() - SUPER_BLOCK_SIZE - 16) % NODE_BLOCK_SIZE != 0 {
        return false;
    }
    let (payload, seal) = bytes.split_at(bytes.len() - 16);
    digest128_to_bytes(fnv128a(payload)) == seal
}

/// The node images inside a validated snapshot.
pub(crate) fn node_images(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes[SUPER_BLOCK_SIZE..bytes.len() - 16].chunks_exact(NODE_BLOCK_SIZE)
}

/// Reads the pending-snapshot length (big-endian).
pub(crate) fn read_len(mmap: &[u8]) -> u32 {
    u32::from_be_bytes(
        mmap[SNAPSHOT_LEN_OFFSET..SNAPSHOT_LEN_OFFSET + 4]
            .try_into()
            .unwrap(),
    )
}

/// Publishes (or clears, with 0) the pending-snapshot length.
pub(crate) fn write_len(mmap: &mut [u8], len: u32) {
    mmap[SNAPSHOT_LEN_OFFSET..SNAPSHOT_LEN_OFFSET + 4].copy_from_slice(&len.to_be_bytes());
}

/// True when a snapshot of `len` bytes lives in the embedded slot rather
/// than the side-car file.
pub(crate) fn is_embedded(len: usize, mmap_len: usize) -> bool {
    len <= SNAPSHOT_EMBED_MAX && SNAPSHOT_BODY_OFFSET + len <= mmap_len
}

/// Path of the side-car snapshot file.
pub(crate) fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".snapshot");
    PathBuf::from(name)
}
