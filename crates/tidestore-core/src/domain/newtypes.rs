//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for the identifiers the
//! protocol passes around. Each newtype ensures data validity at
//! construction time, so the rest of the system never re-checks formats.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::errors::DomainError;

// ============================================================================
// Block hash
// ============================================================================

/// SHA-256 digest of a block's bytes, in lowercase hex
///
/// This is the sole identity of a block: equal bytes produce equal hashes,
/// which is what makes block-level deduplication work. Stored normalized to
/// lowercase so map lookups and wire comparisons never depend on input case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockHash(String);

impl BlockHash {
    /// Length of a SHA-256 digest in hex characters
    pub const HEX_LEN: usize = 64;

    /// Create a BlockHash from an existing hex string
    ///
    /// # Errors
    /// Returns `DomainError::InvalidHash` if the string is not exactly
    /// 64 hex characters
    pub fn new(hash: String) -> Result<Self, DomainError> {
        if hash.len() != Self::HEX_LEN {
            return Err(DomainError::InvalidHash(format!(
                "Hash must be {} hex characters, got {}: {hash}",
                Self::HEX_LEN,
                hash.len()
            )));
        }

        if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidHash(format!(
                "Hash contains non-hex characters: {hash}"
            )));
        }

        Ok(Self(hash.to_ascii_lowercase()))
    }

    /// Compute the hash of the given bytes
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BlockHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlockHash {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for BlockHash {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BlockHash> for String {
    fn from(hash: BlockHash) -> Self {
        hash.0
    }
}

// ============================================================================
// File name
// ============================================================================

/// A flat directory key
///
/// The directory namespace is flat: one segment, no paths. Names are
/// restricted to `[A-Za-z0-9._-]` so they can travel in URL paths without
/// percent-encoding on either side of the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileName(String);

impl FileName {
    /// Maximum length of a file name in bytes
    pub const MAX_LEN: usize = 255;

    /// Create a new FileName
    ///
    /// # Errors
    /// Returns `DomainError::InvalidFileName` if the name is empty, too
    /// long, reserved, or contains characters outside `[A-Za-z0-9._-]`
    pub fn new(name: String) -> Result<Self, DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidFileName(
                "File name cannot be empty".to_string(),
            ));
        }

        if name.len() > Self::MAX_LEN {
            return Err(DomainError::InvalidFileName(format!(
                "File name exceeds {} bytes: {name}",
                Self::MAX_LEN
            )));
        }

        if name == "." || name == ".." {
            return Err(DomainError::InvalidFileName(format!(
                "File name is reserved: {name}"
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(DomainError::InvalidFileName(format!(
                "File name contains invalid characters: {name}"
            )));
        }

        Ok(Self(name))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for FileName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FileName> for String {
    fn from(name: FileName) -> Self {
        name.0
    }
}

// ============================================================================
// Shard index
// ============================================================================

/// Index of a block shard within the configured cluster
///
/// Shard i is the i-th endpoint in `cluster.shards`; every process reads
/// the same list, so the index is a stable cluster-wide address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShardId(u32);

impl ShardId {
    /// Create a ShardId from a cluster index
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the inner u32 value
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Get the index as usize, for indexing the configured shard list
    #[must_use]
    pub const fn as_index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for ShardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShardId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(Self)
            .map_err(|e| DomainError::InvalidShardId(format!("Invalid shard index: {e}")))
    }
}

impl From<u32> for ShardId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

// ============================================================================
// Tests
// ============================================================================
