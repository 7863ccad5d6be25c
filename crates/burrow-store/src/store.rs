//! The store: a single-file key→blob map with a crash-consistent B-tree
//! index.
//!
//! One `RwLock` covers all shared state. `add` and `flag` hold it
//! exclusively for the whole mutation; `get` and `walk` hold it shared and
//! never mutate: the read path descends over committed node images taken
//! straight from the mapped prefix (or read through a transiently leased
//! pool handle for tail nodes), so readers only serialise against writers,
//! never against each other. Blob streaming through [`Data`] happens with
//! no lock held at all.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use burrow_common::{BurrowError, Result, StoreOptions};
use memmap2::{MmapMut, MmapOptions};
use parking_lot::RwLock;
use rand::Rng;
use tracing::{debug, error, warn};

use crate::arena::{NodeArena, NodeId};
use crate::blob;
use crate::constants::{
    MAX_KEY_LEN, NODE_BLOCK_SIZE, NODE_SLOT_SIZE, SNAPSHOT_BODY_OFFSET, SNAPSHOT_SLOT_SIZE,
    SUPER_BLOCK_SIZE,
};
use crate::data::Data;
use crate::key::KeyHash;
use crate::metadata::{unix_now, Metadata};
use crate::node::{NodeBlock, NodeRef, SPLIT_AT};
use crate::pool::FdPool;
use crate::recovery;
use crate::snapshot;
use crate::superblock::SuperBlock;

/// Deterministic fault-injection points for the crash-consistency tests.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// The blob append fails before any I/O.
    BlobWrite,
    /// The process "crashes" after publishing the snapshot length but
    /// before writing its body.
    SnapshotBody,
    /// The first node write inside the critical region fails.
    NodeWrite,
    /// The super-block update inside the critical region fails.
    SuperSync,
}

/// An open store.
pub struct Store {
    inner: RwLock<StoreInner>,
    pool: Arc<FdPool>,
}

struct StoreInner {
    path: PathBuf,
    file: File,
    mmap: MmapMut,
    sb: SuperBlock,
    /// The header bytes as last committed.
    sb_committed: [u8; SUPER_BLOCK_SIZE],
    arena: NodeArena,
    root: Option<NodeId>,
    /// Nodes modified by the mutation in flight.
    dirty: Vec<NodeId>,
    /// Post-operation images staged during the snapshot sync.
    pending: HashMap<NodeId, Box<[u8; NODE_BLOCK_SIZE]>>,
    fatal: bool,
    closed: bool,
    fail: Option<FailPoint>,
}

impl Store {
    /// Opens (or creates) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P, options: StoreOptions) -> Result<Store> {
        options.validate()?;
        let path = path.as_ref().to_path_buf();
        let create = options.force_create || !path.exists();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(create)
            .open(&path)?;

        let sb = if create {
            debug!(path = %path.display(), mmap_size = options.mmap_size, "creating store");
            file.set_len(options.init_size as u64)?;
            let mut salt = [0u8; 16];
            rand::thread_rng().fill(&mut salt[..]);
            let sb = SuperBlock {
                mmap_size: options.mmap_size as i32,
                mmap_size_used: (SUPER_BLOCK_SIZE + SNAPSHOT_SLOT_SIZE) as i32,
                created_at: unix_now(),
                size: 0,
                count: 0,
                salt,
                root_offset: 0,
            };
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&sb.to_bytes())?;
            file.sync_all()?;
            sb
        } else {
            let mut header = [0u8; SUPER_BLOCK_SIZE];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut header)?;
            let sb = SuperBlock::from_bytes(&header)?;

            let file_len = file.metadata()?.len();
            if sb.mmap_size <= 0 || sb.mmap_size as u64 > file_len {
                return Err(BurrowError::Corrupted(format!(
                    "mapped prefix of {} bytes exceeds file of {} bytes",
                    sb.mmap_size, file_len
                )));
            }
            if sb.root_offset < 0 || sb.root_offset as u64 >= file_len {
                return Err(BurrowError::Corrupted(format!(
                    "root offset {} beyond file of {} bytes",
                    sb.root_offset, file_len
                )));
            }
            debug!(path = %path.display(), count = sb.count, "opening store");
            sb
        };

        let mut mmap = unsafe {
            MmapOptions::new()
                .len(sb.mmap_size as usize)
                .map_mut(&file)?
        };
        if let Err(e) = mmap.lock() {
            warn!(error = %e, "could not page-lock the mapped prefix");
        }

        let mut sb = sb;
        if !create {
            if let Some(recovered) = recovery::run(&mut mmap, &mut file, &path)? {
                sb = recovered;
            }
        }

        let handles = (0..options.max_fds)
            .map(|_| File::open(&path))
            .collect::<std::io::Result<Vec<_>>>()?;

        let sb_committed = sb.to_bytes();
        Ok(Store {
            inner: RwLock::new(StoreInner {
                path,
                file,
                mmap,
                sb,
                sb_committed,
                arena: NodeArena::new(),
                root: None,
                dirty: Vec::new(),
                pending: HashMap::new(),
                fatal: false,
                closed: false,
                fail: None,
            }),
            pool: Arc::new(FdPool::new(handles)),
        })
    }

    /// Inserts `key` with the payload streamed from `reader`. Keys are
    /// write-once: inserting an existing key fails with `KeyExists`.
    pub fn add(&self, key: &str, reader: &mut dyn Read) -> Result<()> {
        let mut inner = self.inner.write();
        inner.check_usable()?;
        if key.len() > MAX_KEY_LEN {
            return Err(BurrowError::KeyTooLong { len: key.len() });
        }

        match inner.insert(key, reader) {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                inner.revert_dirties();
                Err(e)
            }
        }
    }

    /// Returns a streaming handle for `key`'s payload.
    pub fn get(&self, key: &str) -> Result<Data> {
        let inner = self.inner.read();
        inner.check_usable()?;
        let meta = inner
            .descend_find(KeyHash::of(key), &self.pool)?
            .ok_or(BurrowError::KeyNotFound)?;
        inner.open_data(meta, &self.pool)
    }

    /// Atomically updates the 64-bit user flag of `key` with `f` and
    /// returns the new value.
    pub fn flag(&self, key: &str, f: impl FnOnce(u64) -> u64) -> Result<u64> {
        let mut inner = self.inner.write();
        inner.check_usable()?;
        match inner.update_flag(KeyHash::of(key), f) {
            Ok(v) => Ok(v),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                inner.revert_dirties();
                Err(e)
            }
        }
    }

    /// Iterates every key in hash order. Items passing `filter` get a
    /// [`Data`] handle and are passed to `cb`; the handle returns to the
    /// pool when dropped, whether or not `cb` consumed it.
    pub fn walk<F, C>(&self, mut filter: F, mut cb: C) -> Result<()>
    where
        F: FnMut(&Metadata) -> bool,
        C: FnMut(&str, Data) -> Result<()>,
    {
        let inner = self.inner.read();
        inner.check_usable()?;
        if inner.sb.root_offset == 0 {
            return Ok(());
        }
        inner.walk_node(inner.sb.root_offset, &self.pool, &mut filter, &mut cb)
    }

    /// Number of live keys.
    pub fn count(&self) -> u64 {
        self.inner.read().sb.count
    }

    /// Total payload bytes accepted.
    pub fn size(&self) -> i64 {
        self.inner.read().sb.size
    }

    /// Releases the reader pool and flushes the mapped prefix. Idempotent;
    /// dropping the store does the same.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.closed {
            return Ok(());
        }
        inner.closed = true;
        self.pool.drain();
        inner.mmap.flush()?;
        Ok(())
    }

    /// Arms (or disarms, with `None`) a fault-injection point.
    #[doc(hidden)]
    pub fn set_fail_point(&self, point: Option<FailPoint>) {
        self.inner.write().fail = point;
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl StoreInner {
    fn check_usable(&self) -> Result<()> {
        if self.fatal {
            return Err(BurrowError::Fatal {
                reason: "store is in fatal state; reopen to recover".to_string(),
                snapshot: Vec::new(),
            });
        }
        if self.closed {
            return Err(BurrowError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "store is closed",
            )));
        }
        Ok(())
    }

    // ---- write path ----

    fn insert(&mut self, key: &str, reader: &mut dyn Read) -> Result<()> {
        let hash = KeyHash::of(key);

        if self.root.is_none() && self.sb.root_offset == 0 {
            let meta = self.append_payload(hash, key, reader)?;
            let mut root = NodeBlock::new();
            root.push_item(meta);
            let id = self.arena.insert(root);
            self.mark_dirty(id);
            self.root = Some(id);
        } else {
            let mut root_id = self.ensure_root()?;
            if self.arena.get(root_id).is_full() {
                root_id = self.grow_root(root_id);
            }
            self.insert_at(root_id, hash, key, reader)?;
        }

        self.sb.count += 1;
        self.sync_dirties()
    }

    /// Splits a full root and grows a fresh one above it.
    fn grow_root(&mut self, old_root: NodeId) -> NodeId {
        let (pivot, right) = self.arena.get_mut(old_root).split(SPLIT_AT);
        let right_id = self.arena.insert(right);

        let mut new_root = NodeBlock::new();
        new_root.push_item(pivot);
        new_root.push_child(self.arena.get(old_root).offset, Some(old_root));
        new_root.push_child(0, Some(right_id));
        let new_root_id = self.arena.insert(new_root);

        self.mark_dirty(old_root);
        self.mark_dirty(right_id);
        self.mark_dirty(new_root_id);
        self.root = Some(new_root_id);
        new_root_id
    }

    fn insert_at(
        &mut self,
        id: NodeId,
        hash: KeyHash,
        key: &str,
        reader: &mut dyn Read,
    ) -> Result<()> {
        let mut idx = match self.arena.get(id).find(hash) {
            Ok(_) => return Err(BurrowError::KeyExists),
            Err(i) => i,
        };

        if self.arena.get(id).is_leaf() {
            let meta = self.append_payload(hash, key, reader)?;
            self.arena.get_mut(id).insert_item_at(idx, meta);
            self.mark_dirty(id);
            return Ok(());
        }

        if self.maybe_split_child(id, idx)? {
            let pivot = self.arena.get(id).item(idx).key();
            match hash.cmp(&pivot) {
                std::cmp::Ordering::Equal => return Err(BurrowError::KeyExists),
                std::cmp::Ordering::Greater => idx += 1,
                std::cmp::Ordering::Less => {}
            }
        }

        let child = self.load_child(id, idx)?;
        self.insert_at(child, hash, key, reader)
    }

    /// Splits child `i` of `parent` when it is full. Returns whether a
    /// split happened.
    fn maybe_split_child(&mut self, parent: NodeId, i: usize) -> Result<bool> {
        let child_id = self.load_child(parent, i)?;
        if !self.arena.get(child_id).is_full() {
            return Ok(false);
        }

        let (pivot, right) = self.arena.get_mut(child_id).split(SPLIT_AT);
        let right_id = self.arena.insert(right);
        let node = self.arena.get_mut(parent);
        node.insert_item_at(i, pivot);
        node.insert_child_at(i + 1, 0, Some(right_id));

        self.mark_dirty(child_id);
        self.mark_dirty(right_id);
        self.mark_dirty(parent);
        Ok(true)
    }

    fn update_flag(&mut self, hash: KeyHash, f: impl FnOnce(u64) -> u64) -> Result<u64> {
        if self.root.is_none() && self.sb.root_offset == 0 {
            return Err(BurrowError::KeyNotFound);
        }
        let root_id = self.ensure_root()?;
        let (id, idx) = self.find_item(root_id, hash)?;

        let old = self.arena.get(id).item(idx).flag();
        let new = f(old);
        if new != old {
            self.arena.get_mut(id).item_mut(idx).flag = new;
            self.mark_dirty(id);
            self.sync_dirties()?;
        }
        Ok(new)
    }

    fn find_item(&mut self, id: NodeId, hash: KeyHash) -> Result<(NodeId, usize)> {
        match self.arena.get(id).find(hash) {
            Ok(i) => Ok((id, i)),
            Err(i) => {
                if self.arena.get(id).is_leaf() {
                    return Err(BurrowError::KeyNotFound);
                }
                let child = self.load_child(id, i)?;
                self.find_item(child, hash)
            }
        }
    }

    fn append_payload(
        &mut self,
        hash: KeyHash,
        key: &str,
        reader: &mut dyn Read,
    ) -> Result<Metadata> {
        let fail = self.fail == Some(FailPoint::BlobWrite);
        let meta = blob::append_blob(&mut self.file, hash, key, reader, fail)?;
        self.sb.size += meta.payload_len() as i64;
        Ok(meta)
    }

    fn mark_dirty(&mut self, id: NodeId) {
        let node = self.arena.get_mut(id);
        if !node.dirty {
            node.dirty = true;
            self.dirty.push(id);
        }
    }

    fn ensure_root(&mut self) -> Result<NodeId> {
        if let Some(id) = self.root {
            return Ok(id);
        }
        let node = self.load_node(self.sb.root_offset)?;
        let id = self.arena.insert(node);
        self.root = Some(id);
        Ok(id)
    }

    /// Loads (or returns the cached) child `i` of `parent`.
    fn load_child(&mut self, parent: NodeId, i: usize) -> Result<NodeId> {
        if let Some(id) = self.arena.get(parent).children[i] {
            return Ok(id);
        }
        let offset = self.arena.get(parent).child_offset(i);
        debug_assert!(offset != 0, "internal node with unresolved child offset");
        let node = self.load_node(offset)?;
        let id = self.arena.insert(node);
        self.arena.get_mut(parent).children[i] = Some(id);
        Ok(id)
    }

    /// Reads a node image through the writer handle.
    fn load_node(&mut self, offset: i64) -> Result<NodeBlock> {
        let mut buf = [0u8; NODE_BLOCK_SIZE];
        if self.in_prefix(offset) {
            let start = offset as usize;
            buf.copy_from_slice(&self.mmap[start..start + NODE_BLOCK_SIZE]);
        } else {
            self.file.seek(SeekFrom::Start(offset as u64))?;
            self.file.read_exact(&mut buf)?;
        }
        NodeBlock::from_bytes(&buf)
    }

    fn in_prefix(&self, offset: i64) -> bool {
        offset >= 0 && offset as usize + NODE_BLOCK_SIZE <= self.mmap.len()
    }

    // ---- snapshot sync ----

    /// Commits the mutation in flight: stages post-operation images,
    /// publishes the master snapshot, then writes everything in place.
    fn sync_dirties(&mut self) -> Result<()> {
        let root_id = match self.root {
            Some(id) if !self.dirty.is_empty() => id,
            _ => return Ok(()),
        };

        // Assign offsets bottom-up: a node's image is only built once every
        // child has one, so parent images never reference offset 0.
        let mut eof = self.file.seek(SeekFrom::End(0))? as i64;
        let mut ordered = Vec::with_capacity(self.dirty.len());
        let mut remaining = self.dirty.clone();
        while !remaining.is_empty() {
            let before = remaining.len();
            let mut next = Vec::new();
            for id in remaining {
                if self.refresh_child_offsets(id) {
                    if self.arena.get(id).offset == 0 {
                        let offset = self.allocate_node_offset(&mut eof);
                        self.arena.get_mut(id).offset = offset;
                    }
                    ordered.push(id);
                } else {
                    next.push(id);
                }
            }
            assert!(next.len() < before, "dirty nodes form no tree");
            remaining = next;
        }

        // Stage the post-operation images and publish the intention. The
        // mutation commits the instant the sealed snapshot is durable:
        // before that a crash discards it, after that recovery completes it.
        self.sb.root_offset = self.arena.get(root_id).offset;
        let sb_image = self.sb.to_bytes();
        for &id in &ordered {
            let image = self.arena.get(id).to_bytes();
            self.pending.insert(id, image);
        }
        let master = snapshot::encode(
            &sb_image,
            ordered.iter().map(|id| &*self.pending[id]),
        );

        snapshot::write_len(&mut self.mmap, master.len() as u32);
        if self.fail == Some(FailPoint::SnapshotBody) {
            return self.enter_fatal("snapshot body never written", &master);
        }

        let embedded = snapshot::is_embedded(master.len(), self.mmap.len());
        if embedded {
            self.mmap[SNAPSHOT_BODY_OFFSET..SNAPSHOT_BODY_OFFSET + master.len()]
                .copy_from_slice(&master);
        } else if let Err(e) = std::fs::write(snapshot::sidecar_path(&self.path), &master) {
            snapshot::write_len(&mut self.mmap, 0);
            return Err(e.into());
        }

        // Critical region: in-place writes. Any failure in here poisons the
        // store; the published snapshot is the repair record.
        for (i, &id) in ordered.iter().enumerate() {
            let inject = self.fail == Some(FailPoint::NodeWrite) && i == 0;
            if inject {
                return self.enter_fatal("injected node write failure", &master);
            }
            if let Err(e) = self.write_node_image(id) {
                error!(error = %e, "node write failed inside the critical region");
                return self.enter_fatal(&format!("node write failed: {e}"), &master);
            }
        }

        if self.fail == Some(FailPoint::SuperSync) {
            return self.enter_fatal("injected super block sync failure", &master);
        }
        self.mmap[..SUPER_BLOCK_SIZE].copy_from_slice(&sb_image);

        // Committed: promote the staged images and retire the snapshot.
        for &id in &ordered {
            let image = self.pending.remove(&id).expect("image staged above");
            let node = self.arena.get_mut(id);
            node.committed = Some(image);
            node.dirty = false;
        }
        assert!(self.pending.is_empty(), "pending images left after commit");
        self.sb_committed = sb_image;
        self.dirty.clear();
        snapshot::write_len(&mut self.mmap, 0);
        if !embedded {
            let _ = std::fs::remove_file(snapshot::sidecar_path(&self.path));
        }
        Ok(())
    }

    /// Copies resolved offsets of loaded children into the offset array.
    /// Returns false while some fresh child still has no offset.
    fn refresh_child_offsets(&mut self, id: NodeId) -> bool {
        let count = self.arena.get(id).child_count();
        for i in 0..count {
            if self.arena.get(id).child_offset(i) != 0 {
                continue;
            }
            let resolved = self.arena.get(id).children[i]
                .map(|child| self.arena.get(child).offset)
                .unwrap_or(0);
            if resolved == 0 {
                return false;
            }
            self.arena.get_mut(id).set_child_offset(i, resolved);
        }
        true
    }

    /// Picks the next node position: the next free slot in the mapped
    /// prefix while one fits, the file tail afterwards.
    fn allocate_node_offset(&mut self, eof: &mut i64) -> i64 {
        let slot = NODE_SLOT_SIZE as i64;
        let aligned = (self.sb.mmap_size_used as i64 + slot - 1) & !(slot - 1);
        if aligned + slot <= self.sb.mmap_size as i64 {
            self.sb.mmap_size_used = (aligned + slot) as i32;
            aligned
        } else {
            let offset = *eof;
            *eof += NODE_BLOCK_SIZE as i64;
            offset
        }
    }

    fn write_node_image(&mut self, id: NodeId) -> std::io::Result<()> {
        let image = self.pending.get(&id).expect("image staged before write");
        let offset = self.arena.get(id).offset;
        if offset >= 0 && offset as usize + NODE_BLOCK_SIZE <= self.mmap.len() {
            let start = offset as usize;
            self.mmap[start..start + NODE_BLOCK_SIZE].copy_from_slice(&image[..]);
        } else {
            self.file.seek(SeekFrom::Start(offset as u64))?;
            self.file.write_all(&image[..])?;
        }
        Ok(())
    }

    fn enter_fatal(&mut self, reason: &str, master: &[u8]) -> Result<()> {
        error!(reason, "store entering fatal state");
        self.fatal = true;
        Err(BurrowError::Fatal {
            reason: reason.to_string(),
            snapshot: master.to_vec(),
        })
    }

    /// Rolls the in-memory state back to the last committed images after a
    /// non-fatal failure. The disk was never touched in place, so dropping
    /// the root reference makes the next access reload the committed tree.
    fn revert_dirties(&mut self) {
        for id in std::mem::take(&mut self.dirty) {
            let node = self.arena.get_mut(id);
            if node.committed.is_some() {
                node.revert_to_committed();
            } else {
                // Fresh node: unreachable once its parent is reverted.
                node.dirty = false;
            }
        }
        self.pending.clear();
        self.sb = SuperBlock::from_bytes(&self.sb_committed)
            .expect("committed header image is valid");
        self.root = None;
    }

    // ---- read path ----

    /// Descends the committed tree looking for `hash`.
    fn descend_find(&self, hash: KeyHash, pool: &Arc<FdPool>) -> Result<Option<Metadata>> {
        let mut offset = self.sb.root_offset;
        if offset == 0 {
            return Ok(None);
        }
        let mut buf = Box::new([0u8; NODE_BLOCK_SIZE]);
        loop {
            self.read_node_image(offset, &mut buf, pool)?;
            let node = NodeRef::new(&buf[..])?;
            match node.find(hash) {
                Ok(i) => return Ok(Some(node.item(i))),
                Err(i) => {
                    if node.child_count() == 0 {
                        return Ok(None);
                    }
                    offset = node.child_offset(i);
                }
            }
        }
    }

    fn walk_node<F, C>(
        &self,
        offset: i64,
        pool: &Arc<FdPool>,
        filter: &mut F,
        cb: &mut C,
    ) -> Result<()>
    where
        F: FnMut(&Metadata) -> bool,
        C: FnMut(&str, Data) -> Result<()>,
    {
        let mut buf = Box::new([0u8; NODE_BLOCK_SIZE]);
        self.read_node_image(offset, &mut buf, pool)?;
        let node = NodeRef::new(&buf[..])?;

        for i in 0..node.item_count() {
            if node.child_count() > 0 {
                self.walk_node(node.child_offset(i), pool, filter, cb)?;
            }
            let meta = node.item(i);
            if filter(&meta) {
                let key = self.key_text(&meta, pool)?;
                let data = self.open_data(meta, pool)?;
                cb(&key, data)?;
            }
        }
        if node.child_count() > 0 {
            self.walk_node(node.child_offset(node.child_count() - 1), pool, filter, cb)?;
        }
        Ok(())
    }

    /// Reconstructs the key text: from the blob record for long keys, from
    /// the hash itself for keys of up to 8 bytes.
    fn key_text(&self, meta: &Metadata, pool: &Arc<FdPool>) -> Result<String> {
        let len = meta.key_len() as usize;
        if len <= 8 {
            return meta.key().short_key_text(len).ok_or_else(|| {
                BurrowError::Corrupted("short key bytes are not valid UTF-8".to_string())
            });
        }
        let mut text = vec![0u8; len];
        let mut fd = pool.acquire();
        let read = fd
            .seek(SeekFrom::Start(meta.offset() as u64))
            .and_then(|_| fd.read_exact(&mut text));
        pool.release(fd);
        read?;
        String::from_utf8(text)
            .map_err(|_| BurrowError::Corrupted("stored key text is not valid UTF-8".to_string()))
    }

    /// Leases a pool handle positioned at the payload start.
    fn open_data(&self, meta: Metadata, pool: &Arc<FdPool>) -> Result<Data> {
        let mut start = meta.offset() as u64;
        if meta.key_len() > 8 {
            start += meta.key_len() as u64;
        }
        let mut fd = pool.acquire();
        if let Err(e) = fd.seek(SeekFrom::Start(start)) {
            pool.release(fd);
            return Err(e.into());
        }
        Ok(Data::new(meta, fd, Arc::clone(pool)))
    }

    /// Copies a committed node image from the prefix or the tail. Tail
    /// reads lease a pool handle for the duration of the read only.
    fn read_node_image(
        &self,
        offset: i64,
        buf: &mut [u8; NODE_BLOCK_SIZE],
        pool: &Arc<FdPool>,
    ) -> Result<()> {
        if self.in_prefix(offset) {
            let start = offset as usize;
            buf.copy_from_slice(&self.mmap[start..start + NODE_BLOCK_SIZE]);
            return Ok(());
        }
        let mut fd = pool.acquire();
        let read = fd
            .seek(SeekFrom::Start(offset as u64))
            .and_then(|_| fd.read_exact(buf));
        pool.release(fd);
        read.map_err(Into::into)
    }
}
