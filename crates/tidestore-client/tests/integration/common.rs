//! Shared test helpers for client integration tests
//!
//! Two flavors of backend: wiremock servers with scripted responses for
//! exercising the HTTP adapters in isolation, and a real in-process
//! cluster (directory plus N block shards on ephemeral ports) for
//! end-to-end engine scenarios.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tidestore_blockstore::{BlockShardServer, BlockStore};
use tidestore_client::{
    DeterministicPlacement, DirectoryClient, ReconcileEngine, RetryPolicy, ShardSet,
};
use tidestore_core::ports::IPlacementStrategy;
use tidestore_directory::{DirectoryServer, FileTable};

/// A running in-process cluster on ephemeral ports.
///
/// Servers shut down when the cluster is dropped.
pub struct Cluster {
    pub directory_url: String,
    pub shard_urls: Vec<String>,
    shutdown: CancellationToken,
}

impl Cluster {
    /// Start one directory and `shard_count` block shards.
    pub async fn start(shard_count: usize) -> Self {
        let shutdown = CancellationToken::new();

        let table = Arc::new(FileTable::new());
        let directory = DirectoryServer::bind(table, "127.0.0.1:0").await.unwrap();
        let directory_url = format!("http://{}", directory.local_addr().unwrap());
        tokio::spawn(directory.run(shutdown.clone()));

        let mut shard_urls = Vec::new();
        for _ in 0..shard_count {
            let store = Arc::new(BlockStore::new());
            let shard = BlockShardServer::bind(store, "127.0.0.1:0").await.unwrap();
            shard_urls.push(format!("http://{}", shard.local_addr().unwrap()));
            tokio::spawn(shard.run(shutdown.clone()));
        }

        Self {
            directory_url,
            shard_urls,
            shutdown,
        }
    }

    /// Engine wired to this cluster with deterministic placement.
    pub fn engine(&self) -> ReconcileEngine {
        let set = ShardSet::from_base_urls(&self.shard_urls);
        let placement = Arc::new(DeterministicPlacement::new(set.count()).unwrap());
        self.engine_with(placement)
    }

    /// Engine wired to this cluster with the given placement strategy.
    pub fn engine_with(&self, placement: Arc<dyn IPlacementStrategy>) -> ReconcileEngine {
        let set = ShardSet::from_base_urls(&self.shard_urls);
        ReconcileEngine::new(
            Arc::new(DirectoryClient::with_base_url(self.directory_url.clone())),
            set.clients(),
            placement,
            RetryPolicy::new(5, Duration::from_millis(5)),
        )
    }

    pub fn shard_set(&self) -> ShardSet {
        ShardSet::from_base_urls(&self.shard_urls)
    }
}

impl Drop for Cluster {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
