//! Deterministic shard selection
//!
//! The default placement rule maps every block hash onto a shard index with
//! no coordination: the hash is interpreted as a 256-bit integer and reduced
//! modulo the shard count. Any client with the same shard list computes the
//! same answer, which is what lets downloads find blocks without asking.

use crate::domain::errors::DomainError;
use crate::domain::newtypes::{BlockHash, ShardId};

/// Map a block hash onto a shard index.
///
/// Folds one hex digit at a time so the arithmetic stays in `u64`: the
/// running remainder is always below `shard_count` between steps, which is
/// exactly the big-integer `mod` without big integers.
///
/// # Errors
/// Returns `DomainError::InvalidShardCount` when `shard_count` is zero.
pub fn shard_for_hash(hash: &BlockHash, shard_count: u32) -> Result<ShardId, DomainError> {
    if shard_count == 0 {
        return Err(DomainError::InvalidShardCount(
            "cluster has no shards".to_string(),
        ));
    }

    let n = u64::from(shard_count);
    let index = hash
        .as_str()
        .chars()
        .filter_map(|c| c.to_digit(16))
        .fold(0u64, |acc, digit| (acc * 16 + u64::from(digit)) % n);

    // index < n <= u32::MAX, the cast cannot truncate
    Ok(ShardId::new(index as u32))
}
