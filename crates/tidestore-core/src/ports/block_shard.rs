//! Block shard port (driven/secondary port)
//!
//! One trait object per configured shard. Shards are independent
//! content-addressed stores with no cross-shard communication; which shard
//! holds which block is decided entirely by the client's placement strategy
//! and remembered in the directory's entries.

use std::time::Duration;

use crate::domain::errors::StoreError;
use crate::domain::newtypes::BlockHash;

/// One content-addressed block server
#[async_trait::async_trait]
pub trait IBlockShard: Send + Sync {
    /// Store `bytes` under `hash`.
    ///
    /// Idempotent: storing a blob that already exists is a no-op. Returns
    /// whether the blob was newly created. Implementations reject bytes
    /// whose digest does not match `hash`.
    async fn store_block(&self, hash: &BlockHash, bytes: Vec<u8>) -> Result<bool, StoreError>;

    /// Fetch the blob stored under `hash`.
    ///
    /// Fails with [`StoreError::BlockNotFound`] when the shard holds no
    /// such blob.
    async fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError>;

    /// Measure a round trip to the shard.
    ///
    /// Doubles as a liveness check and as the probe for latency-based
    /// placement.
    async fn ping(&self) -> Result<Duration, StoreError>;
}
