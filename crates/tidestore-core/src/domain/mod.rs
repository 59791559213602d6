//! Domain types and protocol rules
//!
//! This module contains the core domain types for tidestore:
//! - Newtypes for type-safe, validated identifiers
//! - Versioned file records with absent/tombstone/live semantics
//! - Domain-level and protocol-level error types

pub mod errors;
pub mod newtypes;
pub mod record;

// Re-export commonly used types
pub use errors::{DomainError, StoreError};
pub use newtypes::{BlockHash, FileName, ShardId};
pub use record::{BlockRef, FileRecord};
