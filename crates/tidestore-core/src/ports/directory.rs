//! Metadata directory port (driven/secondary port)
//!
//! This module defines the interface to the single authoritative metadata
//! directory. The production implementation is an HTTP client; the directory
//! server's in-memory table implements the same trait, which is what the
//! engine unit tests run against.
//!
//! ## Design Notes
//!
//! - Returns typed [`StoreError`] rather than `anyhow::Error`: version
//!   conflicts and not-found outcomes are part of the protocol contract,
//!   and the reconciliation engine branches on them.
//! - `modify_file` and `delete_file` are optimistic: they succeed only when
//!   `proposed_version` is exactly one above the directory's current
//!   version, otherwise they change nothing and return
//!   [`StoreError::VersionConflict`] carrying the current version.

use crate::domain::errors::StoreError;
use crate::domain::newtypes::FileName;
use crate::domain::record::{BlockRef, FileRecord};

/// The authoritative filename -> record table
#[async_trait::async_trait]
pub trait IMetadataDirectory: Send + Sync {
    /// Read the current record for `name`.
    ///
    /// Never fails on unknown names: those read as version 0 with no
    /// entries.
    async fn read_file(&self, name: &FileName) -> Result<FileRecord, StoreError>;

    /// Atomically replace the record for `name` with
    /// `{proposed_version, entries}`.
    ///
    /// On success returns the entries whose hashes the directory had not
    /// previously recorded for this filename; the caller must push exactly
    /// those blobs to their shards.
    async fn modify_file(
        &self,
        name: &FileName,
        proposed_version: u64,
        entries: Vec<BlockRef>,
    ) -> Result<Vec<BlockRef>, StoreError>;

    /// Atomically replace the record for `name` with a tombstone at
    /// `proposed_version`.
    ///
    /// Deleting a filename that was never created fails with
    /// [`StoreError::FileNotFound`]; no tombstone is invented.
    async fn delete_file(&self, name: &FileName, proposed_version: u64)
        -> Result<(), StoreError>;
}
