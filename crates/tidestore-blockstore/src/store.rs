//! In-memory content-addressed block set
//!
//! Keys are SHA-256 digests and values are the raw block bytes, so any
//! key stored here is by construction the digest of its value. `put`
//! re-derives the digest before accepting bytes; a mismatch means the
//! caller chunked incorrectly or the bytes were corrupted in flight,
//! and the block is refused rather than stored under a lying key.

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use tidestore_core::chunker::BLOCK_SIZE;
use tidestore_core::domain::errors::{DomainError, StoreError};
use tidestore_core::domain::newtypes::BlockHash;
use tidestore_core::ports::IBlockShard;

/// Concurrent block set for one shard.
#[derive(Debug, Default)]
pub struct BlockStore {
    blocks: DashMap<BlockHash, Vec<u8>>,
}

impl BlockStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: DashMap::new(),
        }
    }

    /// Store a block under its digest.
    ///
    /// Returns `true` if the block was new, `false` if it was already
    /// present. Re-putting an existing block never overwrites: equal
    /// digests imply equal bytes.
    pub fn put(&self, hash: &BlockHash, bytes: Vec<u8>) -> Result<bool, StoreError> {
        if bytes.is_empty() || bytes.len() > BLOCK_SIZE {
            return Err(DomainError::InvalidBlockSize {
                len: bytes.len(),
                max: BLOCK_SIZE,
            }
            .into());
        }

        let computed = BlockHash::of(&bytes);
        if computed != *hash {
            warn!(declared = %hash, computed = %computed, "Rejecting block with wrong digest");
            return Err(DomainError::HashMismatch {
                declared: hash.clone(),
                computed,
            }
            .into());
        }

        match self.blocks.entry(computed) {
            Entry::Occupied(_) => {
                debug!(hash = %hash, "Block already present");
                Ok(false)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(bytes);
                Ok(true)
            }
        }
    }

    /// Fetch a block's bytes by digest.
    pub fn get(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError> {
        self.blocks
            .get(hash)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::BlockNotFound { hash: hash.clone() })
    }

    /// Number of distinct blocks held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[async_trait::async_trait]
impl IBlockShard for BlockStore {
    async fn store_block(&self, hash: &BlockHash, bytes: Vec<u8>) -> Result<bool, StoreError> {
        self.put(hash, bytes)
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError> {
        self.get(hash)
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        // In-process store, nothing to measure.
        Ok(Duration::ZERO)
    }
}
