//! tidestore Core - Domain logic and protocol rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `BlockHash`, `FileName`, `ShardId`, `BlockRef`, `FileRecord`
//! - **Chunking** - fixed-size block splitting and SHA-256 content addressing
//! - **Placement** - deterministic hash-to-shard arithmetic
//! - **Port definitions** - Traits for adapters: `IMetadataDirectory`, `IBlockShard`, `IPlacementStrategy`
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure protocol rules with no transport
//! dependencies. Ports define trait interfaces that the server and client
//! crates implement; the reconciliation engine orchestrates uploads,
//! downloads, and deletes through those interfaces alone.

pub mod chunker;
pub mod config;
pub mod domain;
pub mod placement;
pub mod ports;
