//! Placement strategies for upload
//!
//! Two implementations of the placement port:
//!
//! - [`DeterministicPlacement`] maps each hash to `hash mod shard_count`.
//!   Pure arithmetic, no network, and every client agrees on the answer.
//! - [`NearestShardPlacement`] probes every shard once per upload and
//!   sends all blocks to the fastest responder. Unreachable shards are
//!   skipped; when nothing answers, the upload fails rather than guess.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use tidestore_core::domain::errors::{DomainError, StoreError};
use tidestore_core::domain::newtypes::{BlockHash, ShardId};
use tidestore_core::placement::shard_for_hash;
use tidestore_core::ports::{IBlockShard, IPlacementStrategy};

/// Hash-mod placement over a fixed shard count
pub struct DeterministicPlacement {
    shard_count: u32,
}

impl DeterministicPlacement {
    /// Creates a strategy for a cluster of `shard_count` shards.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidShardCount` for a zero count.
    pub fn new(shard_count: u32) -> Result<Self, DomainError> {
        if shard_count == 0 {
            return Err(DomainError::InvalidShardCount(
                "cluster has no shards".to_string(),
            ));
        }
        Ok(Self { shard_count })
    }
}

#[async_trait::async_trait]
impl IPlacementStrategy for DeterministicPlacement {
    async fn assign(&self, hashes: &[BlockHash]) -> Result<Vec<ShardId>, StoreError> {
        hashes
            .iter()
            .map(|hash| shard_for_hash(hash, self.shard_count).map_err(StoreError::from))
            .collect()
    }
}

/// Latency-probed placement: all blocks go to the fastest shard
pub struct NearestShardPlacement {
    shards: Vec<Arc<dyn IBlockShard>>,
}

impl NearestShardPlacement {
    /// Creates a strategy probing the given roster, ordered by shard
    /// index.
    #[must_use]
    pub fn new(shards: Vec<Arc<dyn IBlockShard>>) -> Self {
        Self { shards }
    }

    /// Probe every shard once and return the fastest reachable one.
    async fn fastest_shard(&self) -> Result<(ShardId, Duration), StoreError> {
        let mut best: Option<(ShardId, Duration)> = None;

        for (i, shard) in self.shards.iter().enumerate() {
            let id = ShardId::new(i as u32);
            match shard.ping().await {
                Ok(rtt) => {
                    debug!(shard = %id, rtt_us = rtt.as_micros() as u64, "Shard probe answered");
                    if best.map_or(true, |(_, best_rtt)| rtt < best_rtt) {
                        best = Some((id, rtt));
                    }
                }
                Err(e) => {
                    warn!(shard = %id, error = %e, "Shard probe failed, skipping");
                }
            }
        }

        best.ok_or_else(|| StoreError::transport("no shard answered the placement probe"))
    }
}

#[async_trait::async_trait]
impl IPlacementStrategy for NearestShardPlacement {
    async fn assign(&self, hashes: &[BlockHash]) -> Result<Vec<ShardId>, StoreError> {
        let (winner, rtt) = self.fastest_shard().await?;
        info!(
            shard = %winner,
            rtt_us = rtt.as_micros() as u64,
            blocks = hashes.len(),
            "Nearest shard selected"
        );
        Ok(vec![winner; hashes.len()])
    }
}
