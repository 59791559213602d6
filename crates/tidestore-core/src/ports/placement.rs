//! Placement strategy port (driven/secondary port)
//!
//! Upload asks a strategy once per file, before submitting the record,
//! so the chosen shard for every block is embedded in the entries the
//! directory stores. Downloaders never consult a strategy; they follow the
//! recorded shard indexes.

use crate::domain::errors::StoreError;
use crate::domain::newtypes::{BlockHash, ShardId};

/// Chooses a shard for each block of an upload
#[async_trait::async_trait]
pub trait IPlacementStrategy: Send + Sync {
    /// Assign one shard per input hash, in input order.
    ///
    /// Called once per upload. Strategies may be pure arithmetic or may
    /// probe the cluster; either way the returned vector has exactly
    /// `hashes.len()` elements.
    async fn assign(&self, hashes: &[BlockHash]) -> Result<Vec<ShardId>, StoreError>;
}
