//! In-memory block index
//!
//! Maps display-order block hash to its parsed header record and
//! source location. Built once by the container reader; afterwards
//! only the `height` and `membership` fields change, during resolution
//! and chain selection. The whole index is discarded at process end.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 32-byte block identifier in canonical display byte order.
pub type BlockHash = [u8; 32];

/// Where a record lives on disk: source file (index into the file
/// table), byte offset of its 8-byte prefix, and total on-disk length
/// (prefix + header + payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    pub file_index: usize,
    pub offset: u64,
    pub len: u64,
}

/// Which chain a block ended up on after selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Membership {
    #[default]
    Unknown,
    Main,
    Side,
}

impl Membership {
    pub fn label(self) -> &'static str {
        match self {
            Membership::Main => "main",
            Membership::Side => "side",
            Membership::Unknown => "unknown",
        }
    }
}

/// One indexed block header.
///
/// `hash`, `prev_hash` and `merkle_root` are stored in display byte
/// order: the digest and the raw header fields are reversed exactly
/// once, at parse time, so map lookups and `hex::encode` need no
/// further conversion.
#[derive(Debug, Clone)]
pub struct BlockRecord {
    pub hash: BlockHash,
    pub prev_hash: BlockHash,
    pub merkle_root: [u8; 32],
    pub version: u32,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
    pub source: SourceLocation,
    /// Distance from the nearest known or virtual genesis. Set exactly
    /// once by height resolution.
    pub height: Option<u64>,
    pub membership: Membership,
}

/// Hash-to-record table plus the ordered table of source files.
///
/// Owned by the run and passed explicitly between components. A later
/// record sharing a hash with an earlier one overwrites it
/// (last-write-wins, not an error).
#[derive(Debug, Default)]
pub struct ChainIndex {
    files: Vec<PathBuf>,
    blocks: HashMap<BlockHash, BlockRecord>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source file, returning its index for `SourceLocation`.
    pub fn add_file(&mut self, path: &Path) -> usize {
        self.files.push(path.to_path_buf());
        self.files.len() - 1
    }

    pub fn file(&self, file_index: usize) -> &Path {
        &self.files[file_index]
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn insert(&mut self, record: BlockRecord) {
        self.blocks.insert(record.hash, record);
    }

    pub fn get(&self, hash: &BlockHash) -> Option<&BlockRecord> {
        self.blocks.get(hash)
    }

    pub fn get_mut(&mut self, hash: &BlockHash) -> Option<&mut BlockRecord> {
        self.blocks.get_mut(hash)
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.blocks.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn hashes(&self) -> impl Iterator<Item = &BlockHash> {
        self.blocks.keys()
    }

    pub fn records(&self) -> impl Iterator<Item = &BlockRecord> {
        self.blocks.values()
    }
}
