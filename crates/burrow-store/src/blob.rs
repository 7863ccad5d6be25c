//! Appending blob records to the file tail.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use burrow_common::{BurrowError, Result};

use crate::constants::{COPY_CHUNK, MAX_PAYLOAD_LEN};
use crate::key::KeyHash;
use crate::metadata::Metadata;

/// Appends one blob record: the key text verbatim when it is longer than 8
/// bytes (shorter keys are reconstructible from the hash), then the payload
/// streamed in 32 KiB chunks through a running CRC32.
///
/// On failure the partially written tail bytes are abandoned in place; no
/// node ever references them. `fail_early` is the deterministic fault
/// switch used by the no-partial-commit tests: it fails the call before any
/// I/O happens.
pub(crate) fn append_blob(
    file: &mut File,
    key: KeyHash,
    key_text: &str,
    reader: &mut dyn Read,
    fail_early: bool,
) -> Result<Metadata> {
    if fail_early {
        return Err(BurrowError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "injected blob write failure",
        )));
    }

    let offset = file.seek(SeekFrom::End(0))? as i64;
    if key_text.len() > 8 {
        file.write_all(key_text.as_bytes())?;
    }

    let mut crc = crc32fast::Hasher::new();
    let mut buf = vec![0u8; COPY_CHUNK];
    let mut written: u64 = 0;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        crc.update(&buf[..n]);
        written += n as u64;
        if written > MAX_PAYLOAD_LEN {
            return Err(BurrowError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "payload exceeds 2^48 - 1 bytes",
            )));
        }
    }

    Ok(Metadata::new(
        key,
        offset,
        key_text.len() as u16,
        written,
        crc.finalize(),
    ))
}
