//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IMetadataDirectory`] - The authoritative filename -> record table
//! - [`IBlockShard`] - One content-addressed block server
//! - [`IPlacementStrategy`] - Chooses a shard for each block of an upload

pub mod block_shard;
pub mod directory;
pub mod placement;

pub use block_shard::IBlockShard;
pub use directory::IMetadataDirectory;
pub use placement::IPlacementStrategy;
