//! tidestore-blockstore - content-addressed block shard
//!
//! One shard holds an unordered set of blocks keyed by SHA-256 digest.
//! Shards are independent of each other and of the metadata directory;
//! a cluster runs any number of them.

pub mod server;
pub mod store;

pub use server::BlockShardServer;
pub use store::BlockStore;
