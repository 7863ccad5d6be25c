//! # burrow-store
//!
//! An append-mostly, crash-consistent, embedded key→blob store.
//!
//! Everything lives in one file: a 72-byte super block, a memory-mapped
//! prefix holding a pending-snapshot slot and the first batch of B-tree
//! nodes, and an appended tail of blob records and overflow nodes. Keys map
//! to 128-bit hashes kept in sorted order inside fixed 3552-byte node
//! blocks; payloads stream in and out with CRC32 verification.
//!
//! Mutations commit through a master snapshot: the post-operation images of
//! every touched node (and the header) are sealed and published before any
//! in-place write happens, so a crash at any instant either discards the
//! operation or lets the next open replay it to completion.
//!
//! ```no_run
//! use burrow_common::StoreOptions;
//! use burrow_store::Store;
//!
//! let store = Store::open("data.burrow", StoreOptions::default())?;
//! store.add("greeting", &mut "hello".as_bytes())?;
//! let payload = store.get("greeting")?.read_all()?;
//! assert_eq!(payload, b"hello");
//! # Ok::<(), burrow_common::BurrowError>(())
//! ```

mod arena;
mod blob;
pub mod constants;
mod data;
mod fnv;
mod key;
mod metadata;
mod node;
mod pool;
mod recovery;
mod snapshot;
mod store;
mod superblock;

pub use burrow_common::{BurrowError, Result, StoreOptions};
pub use data::Data;
pub use key::KeyHash;
pub use metadata::Metadata;
pub use store::{FailPoint, Store};
