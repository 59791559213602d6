//! Versioned file records
//!
//! A [`FileRecord`] is the directory's value for one filename. The version
//! field carries the existence state:
//!
//! - `version == 0`, no entries: the filename has never been created
//! - `version > 0`, no entries: the file was deleted (tombstone)
//! - `version > 0`, entries: live content, entries in concatenation order
//!
//! Records are never removed; a deleted file is recreated by a modify at
//! `tombstone_version + 1`, which keeps the version history monotonic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::newtypes::{BlockHash, ShardId};

/// One entry of a file record: a block and the shard the uploader placed
/// it on. The directory stores the pair verbatim and does not verify that
/// the blob actually resides there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    pub hash: BlockHash,
    pub shard: ShardId,
}

impl BlockRef {
    #[must_use]
    pub fn new(hash: BlockHash, shard: ShardId) -> Self {
        Self { hash, shard }
    }
}

/// The directory's versioned entry for one filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub version: u64,
    pub entries: Vec<BlockRef>,
}

impl FileRecord {
    #[must_use]
    pub fn new(version: u64, entries: Vec<BlockRef>) -> Self {
        Self { version, entries }
    }

    /// The record returned for a filename that has never been created
    #[must_use]
    pub fn absent() -> Self {
        Self {
            version: 0,
            entries: Vec::new(),
        }
    }

    /// True when the filename has never been created
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.version == 0
    }

    /// True when the file existed and was deleted
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.version > 0 && self.entries.is_empty()
    }

    /// True when the record carries downloadable content
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.entries.is_empty()
    }

    /// The version a client must propose to change this record
    #[must_use]
    pub fn next_version(&self) -> u64 {
        self.version + 1
    }

    /// The hashes currently recorded for this file
    ///
    /// A proposed update is diffed against this set to decide which blocks
    /// the uploader still has to push.
    #[must_use]
    pub fn hash_set(&self) -> HashSet<&BlockHash> {
        self.entries.iter().map(|e| &e.hash).collect()
    }
}

impl Default for FileRecord {
    fn default() -> Self {
        Self::absent()
    }
}
