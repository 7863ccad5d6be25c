//! Node blocks: the fixed-size records the B-tree is made of.
//!
//! A node is either a leaf (`child_count == 0`) or an internal node
//! (`child_count == item_count + 1`). Items are sorted by key hash; the
//! keys under child `i` sort strictly below item `i`, the keys under child
//! `i + 1` strictly above.
//!
//! Serialized layout (3552 bytes, little-endian):
//! - magic "xxx0": 4 bytes
//! - item_count: 2 bytes
//! - child_count: 2 bytes
//! - offset: 8 bytes (the node's own position, 0 while unassigned)
//! - items: 63 × 48 bytes
//! - child offsets: 64 × 8 bytes

use burrow_common::{BurrowError, Result};

use crate::arena::NodeId;
use crate::constants::{ITEM_SIZE, MAX_CHILDREN, MAX_ITEMS, NODE_BLOCK_SIZE, NODE_MAGIC};
use crate::key::KeyHash;
use crate::metadata::Metadata;

/// Split pivot for a full node.
pub(crate) const SPLIT_AT: usize = MAX_ITEMS / 2;

const ITEMS_OFFSET: usize = 16;
const CHILDREN_OFFSET: usize = ITEMS_OFFSET + MAX_ITEMS * ITEM_SIZE;

/// A mutable, in-memory node block.
pub(crate) struct NodeBlock {
    /// Position on disk; 0 until the first sync assigns one, immutable after.
    pub(crate) offset: i64,
    item_count: u16,
    child_count: u16,
    items: [Metadata; MAX_ITEMS],
    child_offsets: [i64; MAX_CHILDREN],
    /// Loaded-children cache, parallel to `child_offsets`.
    pub(crate) children: [Option<NodeId>; MAX_CHILDREN],
    /// The node's bytes as last committed to disk; `None` for fresh nodes.
    pub(crate) committed: Option<Box<[u8; NODE_BLOCK_SIZE]>>,
    pub(crate) dirty: bool,
}

impl NodeBlock {
    /// Creates an empty leaf.
    pub(crate) fn new() -> Self {
        Self {
            offset: 0,
            item_count: 0,
            child_count: 0,
            items: [Metadata::zeroed(); MAX_ITEMS],
            child_offsets: [0; MAX_CHILDREN],
            children: [None; MAX_CHILDREN],
            committed: None,
            dirty: false,
        }
    }

    pub(crate) fn item_count(&self) -> usize {
        self.item_count as usize
    }

    pub(crate) fn child_count(&self) -> usize {
        self.child_count as usize
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.child_count == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.item_count as usize >= MAX_ITEMS
    }

    pub(crate) fn item(&self, i: usize) -> &Metadata {
        debug_assert!(i < self.item_count());
        &self.items[i]
    }

    pub(crate) fn item_mut(&mut self, i: usize) -> &mut Metadata {
        debug_assert!(i < self.item_count());
        &mut self.items[i]
    }

    pub(crate) fn child_offset(&self, i: usize) -> i64 {
        debug_assert!(i < self.child_count());
        self.child_offsets[i]
    }

    /// Binary search by key. `Ok(i)` on an exact match, `Err(i)` with the
    /// insertion point otherwise.
    pub(crate) fn find(&self, key: KeyHash) -> std::result::Result<usize, usize> {
        self.items[..self.item_count()].binary_search_by(|m| m.key().cmp(&key))
    }

    /// Inserts an item at `i`, shifting the suffix right.
    pub(crate) fn insert_item_at(&mut self, i: usize, item: Metadata) {
        assert!(!self.is_full(), "insert into full node");
        debug_assert!(i <= self.item_count());
        let count = self.item_count();
        self.items.copy_within(i..count, i + 1);
        self.items[i] = item;
        self.item_count += 1;
    }

    /// Inserts a child at `i`, shifting both the offset array and the
    /// loaded-children cache right.
    pub(crate) fn insert_child_at(&mut self, i: usize, offset: i64, child: Option<NodeId>) {
        assert!(self.child_count() < MAX_CHILDREN, "insert into full node");
        debug_assert!(i <= self.child_count());
        let count = self.child_count();
        self.child_offsets.copy_within(i..count, i + 1);
        self.children.copy_within(i..count, i + 1);
        self.child_offsets[i] = offset;
        self.children[i] = child;
        self.child_count += 1;
    }

    /// Appends an item; only valid while building a fresh node.
    pub(crate) fn push_item(&mut self, item: Metadata) {
        assert!(!self.is_full(), "append to full node");
        self.items[self.item_count()] = item;
        self.item_count += 1;
    }

    /// Appends a child; only valid while building a fresh node.
    pub(crate) fn push_child(&mut self, offset: i64, child: Option<NodeId>) {
        assert!(self.child_count() < MAX_CHILDREN, "append to full node");
        let i = self.child_count();
        self.child_offsets[i] = offset;
        self.children[i] = child;
        self.child_count += 1;
    }

    /// Updates a child offset once the child has been assigned one.
    pub(crate) fn set_child_offset(&mut self, i: usize, offset: i64) {
        debug_assert!(i < self.child_count());
        self.child_offsets[i] = offset;
    }

    /// Splits at `i`: the item at `i` is extracted and returned together
    /// with a fresh node holding everything after it. This node shrinks to
    /// `i` items (and `i + 1` children when internal).
    pub(crate) fn split(&mut self, i: usize) -> (Metadata, NodeBlock) {
        debug_assert!(i < self.item_count());
        let pivot = self.items[i];
        let mut right = NodeBlock::new();

        for j in i + 1..self.item_count() {
            right.push_item(self.items[j]);
        }
        for j in i..self.item_count() {
            self.items[j] = Metadata::zeroed();
        }
        self.item_count = i as u16;

        if self.child_count > 0 {
            for j in i + 1..self.child_count() {
                right.push_child(self.child_offsets[j], self.children[j]);
            }
            for j in i + 1..self.child_count() {
                self.child_offsets[j] = 0;
                self.children[j] = None;
            }
            self.child_count = (i + 1) as u16;
        }

        (pivot, right)
    }

    /// Serializes the node into its on-disk image.
    pub(crate) fn to_bytes(&self) -> Box<[u8; NODE_BLOCK_SIZE]> {
        let mut buf = Box::new([0u8; NODE_BLOCK_SIZE]);
        buf[0..4].copy_from_slice(&NODE_MAGIC);
        buf[4..6].copy_from_slice(&self.item_count.to_le_bytes());
        buf[6..8].copy_from_slice(&self.child_count.to_le_bytes());
        buf[8..16].copy_from_slice(&self.offset.to_le_bytes());
        for (j, item) in self.items[..self.item_count()].iter().enumerate() {
            let start = ITEMS_OFFSET + j * ITEM_SIZE;
            item.write_to(&mut buf[start..start + ITEM_SIZE]);
        }
        for (j, off) in self.child_offsets[..self.child_count()].iter().enumerate() {
            let start = CHILDREN_OFFSET + j * 8;
            buf[start..start + 8].copy_from_slice(&off.to_le_bytes());
        }
        buf
    }

    /// Deserializes a node from its on-disk image, remembering the image as
    /// the node's committed state.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let node = NodeRef::new(bytes)?;
        let mut out = NodeBlock::new();
        out.offset = node.offset();
        out.item_count = node.item_count() as u16;
        out.child_count = node.child_count() as u16;
        for j in 0..node.item_count() {
            out.items[j] = node.item(j);
        }
        for j in 0..node.child_count() {
            out.child_offsets[j] = node.child_offset(j);
        }
        let mut image = Box::new([0u8; NODE_BLOCK_SIZE]);
        image.copy_from_slice(&bytes[..NODE_BLOCK_SIZE]);
        out.committed = Some(image);
        Ok(out)
    }

    /// Overlays the committed image back onto this node and forgets the
    /// loaded children. Only called on nodes that have one.
    pub(crate) fn revert_to_committed(&mut self) {
        let image = self.committed.take().expect("revert without committed image");
        let restored = NodeBlock::from_bytes(&image[..]).expect("committed image is valid");
        *self = restored;
    }
}

/// Zero-copy view over a serialized node, used by the lock-light read path
/// to descend without materialising [`NodeBlock`]s.
pub(crate) struct NodeRef<'a> {
    bytes: &'a [u8],
}

impl<'a> NodeRef<'a> {
    /// Wraps a node image, validating length and magic.
    pub(crate) fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < NODE_BLOCK_SIZE {
            return Err(BurrowError::Corrupted(format!(
                "node image truncated: {} bytes",
                bytes.len()
            )));
        }
        if bytes[0..4] != NODE_MAGIC {
            return Err(BurrowError::WrongMagic);
        }
        Ok(Self { bytes })
    }

    pub(crate) fn item_count(&self) -> usize {
        u16::from_le_bytes(self.bytes[4..6].try_into().unwrap()) as usize
    }

    pub(crate) fn child_count(&self) -> usize {
        u16::from_le_bytes(self.bytes[6..8].try_into().unwrap()) as usize
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from_le_bytes(self.bytes[8..16].try_into().unwrap())
    }

    pub(crate) fn item(&self, i: usize) -> Metadata {
        debug_assert!(i < self.item_count());
        let start = ITEMS_OFFSET + i * ITEM_SIZE;
        Metadata::read_from(&self.bytes[start..start + ITEM_SIZE])
    }

    fn item_key(&self, i: usize) -> KeyHash {
        let start = ITEMS_OFFSET + i * ITEM_SIZE;
        KeyHash::from_bytes(&self.bytes[start..start + 16])
    }

    pub(crate) fn child_offset(&self, i: usize) -> i64 {
        debug_assert!(i < self.child_count());
        let start = CHILDREN_OFFSET + i * 8;
        i64::from_le_bytes(self.bytes[start..start + 8].try_into().unwrap())
    }

    /// Binary search by key over the raw image.
    pub(crate) fn find(&self, key: KeyHash) -> std::result::Result<usize, usize> {
        let mut low = 0usize;
        let mut high = self.item_count();
        while low < high {
            let mid = low + (high - low) / 2;
            match self.item_key(mid).cmp(&key) {
                std::cmp::Ordering::Equal => return Ok(mid),
                std::cmp::Ordering::Less => low = mid + 1,
                std::cmp::Ordering::Greater => high = mid,
            }
        }
        Err(low)
    }
}
