//! URL routes for the directory and shard servers
//!
//! Builders for the client side, parsers for the server side. File names
//! and block hashes are URL-safe by construction, so paths are plain
//! concatenation with no percent-encoding.

use tidestore_core::domain::newtypes::{BlockHash, FileName};

/// Prefix for directory file operations
pub const FILES_PREFIX: &str = "/v1/files/";

/// Prefix for shard block operations
pub const BLOCKS_PREFIX: &str = "/v1/blocks/";

/// Shard liveness and latency probe
pub const PING_PATH: &str = "/v1/ping";

/// Directory health endpoint
pub const HEALTH_PATH: &str = "/healthz";

/// Path for one file's directory record
#[must_use]
pub fn file_path(name: &FileName) -> String {
    format!("{FILES_PREFIX}{name}")
}

/// Path for one block on a shard
#[must_use]
pub fn block_path(hash: &BlockHash) -> String {
    format!("{BLOCKS_PREFIX}{hash}")
}

/// Extract the filename segment from a request path.
///
/// Returns `None` for paths outside the files route or with extra
/// segments; the caller still validates the segment as a [`FileName`].
#[must_use]
pub fn parse_file_path(path: &str) -> Option<&str> {
    path.strip_prefix(FILES_PREFIX)
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// Extract the hash segment from a request path.
#[must_use]
pub fn parse_block_path(path: &str) -> Option<&str> {
    path.strip_prefix(BLOCKS_PREFIX)
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}
