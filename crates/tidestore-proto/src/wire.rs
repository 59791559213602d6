//! Request and response bodies
//!
//! Directory responses reuse [`FileRecord`] from the core crate directly;
//! its serde shape (`{"version": .., "entries": [{"hash", "shard"}]}`) is
//! the wire format. Everything else is defined here.

use serde::{Deserialize, Serialize};
use tidestore_core::domain::record::BlockRef;

/// `PUT /v1/files/{name}` request: the full proposed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyRequest {
    /// Proposed version; must be current + 1
    pub version: u64,
    /// Complete entry list for the new file content, in order
    pub entries: Vec<BlockRef>,
}

/// `PUT /v1/files/{name}` success response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyResponse {
    /// Entries the directory had not seen for this filename; the client
    /// must push these blobs
    pub missing: Vec<BlockRef>,
}

/// `DELETE /v1/files/{name}` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Proposed tombstone version; must be current + 1
    pub version: u64,
}

/// `PUT /v1/blocks/{hash}` success response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutBlockResponse {
    /// False when the blob already existed (idempotent re-put)
    pub created: bool,
}

/// Machine-readable error discriminant carried in non-2xx JSON bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    VersionConflict,
    NotFound,
    BlockNotFound,
    BadRequest,
}

impl ErrorCode {
    /// The HTTP status this code travels under
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::VersionConflict => 409,
            ErrorCode::NotFound | ErrorCode::BlockNotFound => 404,
            ErrorCode::BadRequest => 400,
        }
    }
}

/// Error envelope for every non-2xx JSON response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    /// Present only on version conflicts: the version the caller must
    /// re-read from
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub current_version: Option<u64>,
}

impl ErrorBody {
    #[must_use]
    pub fn version_conflict(current: u64) -> Self {
        Self {
            code: ErrorCode::VersionConflict,
            message: format!("proposed version must be {}", current + 1),
            current_version: Some(current),
        }
    }

    #[must_use]
    pub fn not_found(name: &str) -> Self {
        Self {
            code: ErrorCode::NotFound,
            message: format!("no such file: {name}"),
            current_version: None,
        }
    }

    #[must_use]
    pub fn block_not_found(hash: &str) -> Self {
        Self {
            code: ErrorCode::BlockNotFound,
            message: format!("no such block: {hash}"),
            current_version: None,
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            message: message.into(),
            current_version: None,
        }
    }
}
