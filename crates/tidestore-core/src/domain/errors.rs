//! Domain and protocol error types
//!
//! [`DomainError`] covers construction-time validation failures.
//! [`StoreError`] is the protocol taxonomy shared by the directory, the
//! shards, and the reconciliation engine: conflict and not-found outcomes
//! are part of the wire contract and drive client behavior, so they are
//! modeled as variants rather than opaque error strings.

use thiserror::Error;

use super::newtypes::BlockHash;

/// Errors raised when constructing or validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid block hash format
    #[error("Invalid block hash: {0}")]
    InvalidHash(String),

    /// Invalid file name
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// Invalid shard index
    #[error("Invalid shard index: {0}")]
    InvalidShardId(String),

    /// Invalid shard count for placement
    #[error("Invalid shard count: {0}")]
    InvalidShardCount(String),

    /// Block payload outside the allowed size range
    #[error("Invalid block size {len}: blocks hold 1 to {max} bytes")]
    InvalidBlockSize { len: usize, max: usize },

    /// Block bytes do not hash to their declared identity
    #[error("Block bytes hash to {computed}, declared {declared}")]
    HashMismatch {
        declared: BlockHash,
        computed: BlockHash,
    },
}

/// Protocol-level failures returned by directory, shard, and engine
/// operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The proposed version was not exactly one above the current version.
    /// Carries the version the caller must re-read from.
    #[error("version conflict: current version is {current}")]
    VersionConflict { current: u64 },

    /// The filename has no live content (never created, or tombstoned)
    #[error("file not found: {name}")]
    FileNotFound { name: String },

    /// The shard holds no blob under the requested hash
    #[error("block not found: {hash}")]
    BlockNotFound { hash: BlockHash },

    /// The conflict retry budget ran out without a successful submit
    #[error("{operation} gave up after {attempts} version conflicts")]
    RetryExhausted {
        operation: &'static str,
        attempts: u32,
    },

    /// Connection or HTTP-level failure talking to a server
    #[error("transport failure: {detail}")]
    Transport { detail: String },

    /// The server answered outside the wire contract
    #[error("protocol violation: {detail}")]
    Protocol { detail: String },

    /// A value failed domain validation at a boundary
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Local filesystem failure while reading or writing file content
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol {
            detail: detail.into(),
        }
    }
}
