//! Fixed-size block chunking and reassembly
//!
//! Files are split into consecutive [`BLOCK_SIZE`]-byte blocks; the final
//! block holds whatever remains. Each block is addressed by the SHA-256 hex
//! digest of its exact bytes, so identical content chunks to identical
//! hashes no matter which file it came from.

use std::collections::HashMap;

use crate::domain::errors::StoreError;
use crate::domain::newtypes::BlockHash;

/// Bytes per block. Only the last block of a file may be shorter.
pub const BLOCK_SIZE: usize = 4096;

/// One content-addressed chunk of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub hash: BlockHash,
    pub bytes: Vec<u8>,
}

/// Split `data` into consecutive blocks of [`BLOCK_SIZE`] bytes.
///
/// An empty input yields no blocks. Whether that means "empty file" or
/// "no file" is carried by the directory version, never by this list.
#[must_use]
pub fn chunk_bytes(data: &[u8]) -> Vec<Block> {
    data.chunks(BLOCK_SIZE)
        .map(|chunk| Block {
            hash: BlockHash::of(chunk),
            bytes: chunk.to_vec(),
        })
        .collect()
}

/// Index `data`'s blocks by hash.
///
/// Download uses this on the existing local copy of a file so blocks that
/// did not change are reused instead of fetched. Duplicate blocks collapse
/// to a single map entry.
#[must_use]
pub fn block_map(data: &[u8]) -> HashMap<BlockHash, Vec<u8>> {
    chunk_bytes(data)
        .into_iter()
        .map(|block| (block.hash, block.bytes))
        .collect()
}

/// Concatenate blocks in `order`, taking bytes from `blocks`.
///
/// # Errors
/// Returns [`StoreError::BlockNotFound`] if any hash in `order` has no
/// bytes available.
pub fn assemble(
    order: &[BlockHash],
    blocks: &HashMap<BlockHash, Vec<u8>>,
) -> Result<Vec<u8>, StoreError> {
    let mut out = Vec::with_capacity(order.len() * BLOCK_SIZE);
    for hash in order {
        let bytes = blocks
            .get(hash)
            .ok_or_else(|| StoreError::BlockNotFound { hash: hash.clone() })?;
        out.extend_from_slice(bytes);
    }
    Ok(out)
}
