//! Open-time replay of a pending master snapshot.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use burrow_common::{BurrowError, Result};
use memmap2::MmapMut;
use tracing::{debug, warn};

use crate::constants::{NODE_BLOCK_SIZE, SNAPSHOT_BODY_OFFSET, SUPER_BLOCK_SIZE};
use crate::snapshot;
use crate::superblock::SuperBlock;

/// Checks the pending-snapshot slot and replays the snapshot when one is
/// present and sealed.
///
/// Returns the super block recorded in the snapshot when a replay happened,
/// so the caller adopts the recovered state. A torn or unreadable snapshot
/// is discarded: the interrupted operation never reached its commit point,
/// and the committed state on disk is already consistent. Replay itself is
/// idempotent; the slot is cleared only after every image has been written
/// back, so a crash mid-replay retries on the next open.
pub(crate) fn run(
    mmap: &mut MmapMut,
    file: &mut File,
    path: &Path,
) -> Result<Option<SuperBlock>> {
    let len = snapshot::read_len(mmap) as usize;
    if len == 0 {
        return Ok(None);
    }

    let sidecar = snapshot::sidecar_path(path);
    let bytes = if snapshot::is_embedded(len, mmap.len()) {
        Some(mmap[SNAPSHOT_BODY_OFFSET..SNAPSHOT_BODY_OFFSET + len].to_vec())
    } else {
        match std::fs::read(&sidecar) {
            Ok(b) if b.len() == len => Some(b),
            Ok(b) => {
                warn!(expected = len, got = b.len(), "side-car snapshot length mismatch");
                None
            }
            Err(e) => {
                warn!(error = %e, "side-car snapshot unreadable");
                None
            }
        }
    };

    let bytes = match bytes {
        Some(b) if snapshot::validate(&b) => b,
        _ => {
            // The marker was published but the body never sealed: the
            // interrupted operation is discarded.
            warn!(len, "discarding torn snapshot");
            snapshot::write_len(mmap, 0);
            let _ = std::fs::remove_file(&sidecar);
            return Ok(None);
        }
    };

    let sb_image: &[u8; SUPER_BLOCK_SIZE] = bytes[..SUPER_BLOCK_SIZE].try_into().unwrap();
    let sb = SuperBlock::from_bytes(sb_image).map_err(|e| {
        BurrowError::SnapshotRecoveryFailed(format!("snapshot super block invalid: {e}"))
    })?;

    let mut replayed = 0usize;
    for image in snapshot::node_images(&bytes) {
        let offset = i64::from_le_bytes(image[8..16].try_into().unwrap());
        if offset <= 0 {
            return Err(BurrowError::SnapshotRecoveryFailed(format!(
                "snapshot node has offset {offset}"
            )));
        }
        let offset = offset as usize;
        if offset + NODE_BLOCK_SIZE <= mmap.len() {
            mmap[offset..offset + NODE_BLOCK_SIZE].copy_from_slice(image);
        } else {
            file.seek(SeekFrom::Start(offset as u64))
                .and_then(|_| file.write_all(image))
                .map_err(|e| {
                    BurrowError::SnapshotRecoveryFailed(format!(
                        "node replay at offset {offset} failed: {e}"
                    ))
                })?;
        }
        replayed += 1;
    }

    mmap[..SUPER_BLOCK_SIZE].copy_from_slice(sb_image);
    snapshot::write_len(mmap, 0);
    let _ = std::fs::remove_file(&sidecar);

    debug!(nodes = replayed, count = sb.count, "replayed pending snapshot");
    Ok(Some(sb))
}
