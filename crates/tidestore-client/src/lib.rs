//! tidestore-client - cluster adapters and reconciliation engine
//!
//! This crate is the client half of tidestore: HTTP adapters for the
//! metadata directory and the block shards, the placement strategies
//! that pick a shard per block, and the [`ReconcileEngine`] that drives
//! whole-file upload, download, and delete against a cluster.
//!
//! ## Architecture
//!
//! The engine depends only on the port traits from `tidestore-core`;
//! the HTTP adapters here implement them for a real cluster, and the
//! in-memory implementations from the server crates stand in for unit
//! tests.

pub mod directory;
pub mod engine;
pub mod placement;
pub mod shards;

pub use directory::DirectoryClient;
pub use engine::{
    DeleteOutcome, DownloadOutcome, ReconcileEngine, RetryPolicy, StatOutcome, UploadOutcome,
};
pub use placement::{DeterministicPlacement, NearestShardPlacement};
pub use shards::{ShardClient, ShardSet};
