//! HTTP clients for the block shards
//!
//! [`ShardClient`] speaks one shard's octet-stream protocol;
//! [`ShardSet`] builds the full roster from cluster configuration and
//! hands out the trait objects the engine and the placement strategies
//! work against. A record may only reference shard indexes that exist
//! in the roster; anything else is reported as a protocol violation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use tracing::debug;

use tidestore_core::config::ClusterConfig;
use tidestore_core::domain::errors::StoreError;
use tidestore_core::domain::newtypes::{BlockHash, ShardId};
use tidestore_core::ports::IBlockShard;
use tidestore_proto::routes;
use tidestore_proto::wire::{ErrorBody, ErrorCode, PutBlockResponse};

/// HTTP client for one block shard server
pub struct ShardClient {
    client: Client,
    base_url: String,
    shard: ShardId,
}

impl ShardClient {
    /// Creates a client for the shard at `host:port`.
    pub fn new(shard: ShardId, endpoint: &str) -> Self {
        Self::with_base_url(shard, format!("http://{endpoint}"))
    }

    /// Creates a client with a full base URL (useful for testing).
    pub fn with_base_url(shard: ShardId, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            shard,
        }
    }

    /// Which shard slot this client talks to.
    pub fn shard(&self) -> ShardId {
        self.shard
    }

    /// Returns the base URL requests are built against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Stores `bytes` under `hash`. Returns whether the blob was new.
    pub async fn put_block(&self, hash: &BlockHash, bytes: Vec<u8>) -> Result<bool, StoreError> {
        let url = self.url(&routes::block_path(hash));
        debug!(shard = %self.shard, hash = %hash, len = bytes.len(), "Pushing block");

        let response = self
            .client
            .put(&url)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StoreError::transport(format!("put to shard {} failed: {e}", self.shard)))?;

        if !response.status().is_success() {
            return Err(error_from(self.shard, hash, response).await);
        }

        let body: PutBlockResponse = response.json().await.map_err(|e| {
            StoreError::protocol(format!("invalid put response from shard {}: {e}", self.shard))
        })?;
        Ok(body.created)
    }

    /// Fetches the blob stored under `hash`.
    pub async fn fetch_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError> {
        let url = self.url(&routes::block_path(hash));
        debug!(shard = %self.shard, hash = %hash, "Fetching block");

        let response = self.client.get(&url).send().await.map_err(|e| {
            StoreError::transport(format!("get from shard {} failed: {e}", self.shard))
        })?;

        if !response.status().is_success() {
            return Err(error_from(self.shard, hash, response).await);
        }

        let bytes = response.bytes().await.map_err(|e| {
            StoreError::transport(format!("reading block from shard {} failed: {e}", self.shard))
        })?;
        Ok(bytes.to_vec())
    }

    /// Round-trip time to the shard's ping endpoint.
    pub async fn measure_ping(&self) -> Result<Duration, StoreError> {
        let url = self.url(routes::PING_PATH);
        let start = Instant::now();

        let response = self.client.get(&url).send().await.map_err(|e| {
            StoreError::transport(format!("ping to shard {} failed: {e}", self.shard))
        })?;

        if !response.status().is_success() {
            return Err(StoreError::protocol(format!(
                "shard {} ping returned {}",
                self.shard,
                response.status()
            )));
        }

        Ok(start.elapsed())
    }
}

/// Translate a non-success shard response into a [`StoreError`].
async fn error_from(shard: ShardId, hash: &BlockHash, response: Response) -> StoreError {
    let status = response.status();

    match response.json::<ErrorBody>().await {
        Ok(body) => match body.code {
            ErrorCode::BlockNotFound => StoreError::BlockNotFound { hash: hash.clone() },
            _ => StoreError::protocol(format!("shard {shard} returned {status}: {}", body.message)),
        },
        Err(_) => StoreError::protocol(format!("shard {shard} returned {status} with opaque body")),
    }
}

#[async_trait::async_trait]
impl IBlockShard for ShardClient {
    async fn store_block(&self, hash: &BlockHash, bytes: Vec<u8>) -> Result<bool, StoreError> {
        self.put_block(hash, bytes).await
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError> {
        self.fetch_block(hash).await
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        self.measure_ping().await
    }
}

/// The full shard roster of a cluster, ordered by shard index
pub struct ShardSet {
    shards: Vec<Arc<ShardClient>>,
}

impl ShardSet {
    /// Builds the roster from the `cluster.shards` list, assigning shard
    /// indexes in configuration order.
    #[must_use]
    pub fn from_cluster(cluster: &ClusterConfig) -> Self {
        Self {
            shards: cluster
                .shards
                .iter()
                .enumerate()
                .map(|(i, endpoint)| Arc::new(ShardClient::new(ShardId::new(i as u32), endpoint)))
                .collect(),
        }
    }

    /// Builds the roster from full base URLs (useful for testing).
    #[must_use]
    pub fn from_base_urls<S: AsRef<str>>(urls: &[S]) -> Self {
        Self {
            shards: urls
                .iter()
                .enumerate()
                .map(|(i, url)| {
                    Arc::new(ShardClient::with_base_url(
                        ShardId::new(i as u32),
                        url.as_ref().to_string(),
                    ))
                })
                .collect(),
        }
    }

    /// The client for one shard index.
    pub fn get(&self, shard: ShardId) -> Result<&Arc<ShardClient>, StoreError> {
        self.shards.get(shard.as_index()).ok_or_else(|| {
            StoreError::protocol(format!(
                "record references shard {shard} but only {} are configured",
                self.shards.len()
            ))
        })
    }

    /// Number of shards in the roster.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.shards.len() as u32
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// The roster as port trait objects, ordered by shard index.
    #[must_use]
    pub fn clients(&self) -> Vec<Arc<dyn IBlockShard>> {
        self.shards
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn IBlockShard>)
            .collect()
    }
}
