//! Reconciliation engine
//!
//! The [`ReconcileEngine`] drives whole-file operations against a
//! cluster: chunk and upload, download and reassemble, delete. It owns
//! no state of its own; the directory holds the truth and the engine
//! reconciles local bytes with it.
//!
//! ## Conflict handling
//!
//! Every mutation proposes `current + 1` for the directory's version
//! gate. When another client wins the race the directory answers with a
//! version conflict, and the engine re-reads and re-proposes with
//! exponential backoff until the retry budget runs out. Transport and
//! protocol failures are never retried here; only the conflict path is.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use tidestore_core::chunker;
use tidestore_core::config::RetryConfig;
use tidestore_core::domain::errors::{DomainError, StoreError};
use tidestore_core::domain::newtypes::{BlockHash, FileName, ShardId};
use tidestore_core::domain::record::BlockRef;
use tidestore_core::ports::{IBlockShard, IMetadataDirectory, IPlacementStrategy};

// ============================================================================
// Retry policy
// ============================================================================

/// Bounded exponential backoff for version conflicts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum submit attempts per operation
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Build from the `retry` section of the configuration.
    #[must_use]
    pub fn from_config(retry: &RetryConfig) -> Self {
        Self {
            max_attempts: retry.max_attempts,
            base_delay: Duration::from_millis(retry.base_delay_ms),
        }
    }

    /// Backoff before retry number `retry` (zero-based): `base * 2^retry`.
    fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

// ============================================================================
// Operation outcomes
// ============================================================================

/// Summary of a completed upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Version the directory committed
    pub version: u64,
    /// Total blocks in the file
    pub blocks_total: usize,
    /// Blocks actually pushed to shards (deduplicated)
    pub blocks_pushed: usize,
    /// Submit attempts used, including the successful one
    pub attempts: u32,
}

/// Summary of a completed download
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// Version of the record that was materialized
    pub version: u64,
    /// Total blocks in the file
    pub blocks_total: usize,
    /// Blocks fetched over the network
    pub blocks_fetched: usize,
    /// Blocks satisfied without a fetch (local reuse)
    pub blocks_reused: usize,
    /// Bytes written to the destination
    pub bytes_written: usize,
}

/// Summary of a completed delete
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    /// Version of the tombstone the directory committed
    pub version: u64,
    /// Submit attempts used, including the successful one
    pub attempts: u32,
}

/// Snapshot of one file's directory record
#[derive(Debug, Clone)]
pub struct StatOutcome {
    /// Current version
    pub version: u64,
    /// Blocks recorded for the file
    pub blocks_total: usize,
    /// Whether the record is a tombstone
    pub tombstone: bool,
}

// ============================================================================
// Engine
// ============================================================================

/// Whole-file reconciliation against a cluster
///
/// ## Dependencies
///
/// - `directory`: the authoritative metadata table
/// - `shards`: block stores, ordered by shard index
/// - `placement`: chooses a shard per block, consulted once per upload
/// - `retry`: conflict backoff budget
pub struct ReconcileEngine {
    directory: Arc<dyn IMetadataDirectory>,
    shards: Vec<Arc<dyn IBlockShard>>,
    placement: Arc<dyn IPlacementStrategy>,
    retry: RetryPolicy,
}

impl ReconcileEngine {
    pub fn new(
        directory: Arc<dyn IMetadataDirectory>,
        shards: Vec<Arc<dyn IBlockShard>>,
        placement: Arc<dyn IPlacementStrategy>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            directory,
            shards,
            placement,
            retry,
        }
    }

    /// The shard for a recorded index.
    fn shard(&self, id: ShardId) -> Result<&Arc<dyn IBlockShard>, StoreError> {
        self.shards.get(id.as_index()).ok_or_else(|| {
            StoreError::protocol(format!(
                "record references shard {id} but only {} are configured",
                self.shards.len()
            ))
        })
    }

    /// Upload a local file under its base name.
    ///
    /// Chunks the file, asks the placement strategy for one shard per
    /// block, then submits the record and pushes exactly the blocks the
    /// directory reported missing. Version conflicts are retried with
    /// backoff; all other errors abort.
    #[tracing::instrument(skip(self))]
    pub async fn upload(&self, path: &Path) -> Result<UploadOutcome, StoreError> {
        let name = file_name_of(path)?;
        let data = tokio::fs::read(path).await?;

        // Step 1: chunk and place. Placement runs once per upload so the
        // record embeds a stable shard for every block.
        let blocks = chunker::chunk_bytes(&data);
        let hashes: Vec<BlockHash> = blocks.iter().map(|b| b.hash.clone()).collect();
        let assigned = self.placement.assign(&hashes).await?;

        let entries: Vec<BlockRef> = hashes
            .into_iter()
            .zip(assigned)
            .map(|(hash, shard)| BlockRef { hash, shard })
            .collect();

        let payloads: HashMap<&BlockHash, &Vec<u8>> =
            blocks.iter().map(|b| (&b.hash, &b.bytes)).collect();

        debug!(file = %name, bytes = data.len(), blocks = blocks.len(), "Upload prepared");

        // Step 2: submit under the version gate, retrying conflicts.
        let mut attempts = 0u32;
        loop {
            let current = self.directory.read_file(&name).await?;
            let proposed = current.next_version();
            attempts += 1;

            match self
                .directory
                .modify_file(&name, proposed, entries.clone())
                .await
            {
                Ok(missing) => {
                    // Step 3: push only what the directory had no hash for.
                    let blocks_pushed = self.push_missing(&missing, &payloads).await?;
                    info!(
                        file = %name,
                        version = proposed,
                        blocks = entries.len(),
                        pushed = blocks_pushed,
                        attempts,
                        "Upload committed"
                    );
                    return Ok(UploadOutcome {
                        version: proposed,
                        blocks_total: entries.len(),
                        blocks_pushed,
                        attempts,
                    });
                }
                Err(StoreError::VersionConflict { current }) => {
                    self.backoff_or_give_up("upload", &name, current, attempts)
                        .await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Push the reported-missing blocks to their assigned shards.
    ///
    /// The directory reports one entry per missing position, so a file
    /// repeating a block yields duplicates here; each (hash, shard) pair
    /// is pushed once.
    async fn push_missing(
        &self,
        missing: &[BlockRef],
        payloads: &HashMap<&BlockHash, &Vec<u8>>,
    ) -> Result<usize, StoreError> {
        let mut pushed: HashSet<(&BlockHash, ShardId)> = HashSet::new();
        let mut count = 0usize;

        for entry in missing {
            if !pushed.insert((&entry.hash, entry.shard)) {
                continue;
            }

            let bytes = payloads.get(&entry.hash).ok_or_else(|| {
                StoreError::protocol(format!(
                    "directory reported hash {} missing but the upload never produced it",
                    entry.hash
                ))
            })?;

            self.shard(entry.shard)?
                .store_block(&entry.hash, bytes.to_vec())
                .await?;
            count += 1;
        }

        Ok(count)
    }

    /// Download a file into `dest`.
    ///
    /// Blocks already present in an existing `dest` are reused; only the
    /// rest are fetched, each from the shard its record entry names.
    #[tracing::instrument(skip(self))]
    pub async fn download(
        &self,
        name: &FileName,
        dest: &Path,
    ) -> Result<DownloadOutcome, StoreError> {
        let record = self.directory.read_file(name).await?;
        if !record.has_content() {
            return Err(StoreError::FileNotFound {
                name: name.to_string(),
            });
        }

        // Step 1: index whatever the destination already holds.
        let mut have = match tokio::fs::read(dest).await {
            Ok(existing) => chunker::block_map(&existing),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        // Step 2: fetch the gaps, each from its recorded shard.
        let mut fetched = 0usize;
        for entry in &record.entries {
            if have.contains_key(&entry.hash) {
                continue;
            }
            let bytes = self.shard(entry.shard)?.get_block(&entry.hash).await?;
            have.insert(entry.hash.clone(), bytes);
            fetched += 1;
        }

        // Step 3: reassemble in record order and write out.
        let order: Vec<BlockHash> = record.entries.iter().map(|e| e.hash.clone()).collect();
        let data = chunker::assemble(&order, &have)?;
        tokio::fs::write(dest, &data).await?;

        let blocks_total = record.entries.len();
        info!(
            file = %name,
            version = record.version,
            blocks = blocks_total,
            fetched,
            bytes = data.len(),
            "Download complete"
        );
        Ok(DownloadOutcome {
            version: record.version,
            blocks_total,
            blocks_fetched: fetched,
            blocks_reused: blocks_total - fetched,
            bytes_written: data.len(),
        })
    }

    /// Tombstone a file.
    ///
    /// Only a file with live content can be deleted; absent and already
    /// tombstoned names both fail with not-found. Version conflicts are
    /// retried like uploads.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, name: &FileName) -> Result<DeleteOutcome, StoreError> {
        let mut attempts = 0u32;
        loop {
            let current = self.directory.read_file(name).await?;
            if !current.has_content() {
                return Err(StoreError::FileNotFound {
                    name: name.to_string(),
                });
            }

            let proposed = current.next_version();
            attempts += 1;

            match self.directory.delete_file(name, proposed).await {
                Ok(()) => {
                    info!(file = %name, version = proposed, attempts, "Delete committed");
                    return Ok(DeleteOutcome {
                        version: proposed,
                        attempts,
                    });
                }
                Err(StoreError::VersionConflict { current }) => {
                    self.backoff_or_give_up("delete", name, current, attempts)
                        .await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Read a file's record without touching block data.
    #[tracing::instrument(skip(self))]
    pub async fn stat(&self, name: &FileName) -> Result<StatOutcome, StoreError> {
        let record = self.directory.read_file(name).await?;
        if record.is_absent() {
            return Err(StoreError::FileNotFound {
                name: name.to_string(),
            });
        }

        Ok(StatOutcome {
            version: record.version,
            blocks_total: record.entries.len(),
            tombstone: record.is_tombstone(),
        })
    }

    /// Sleep out the backoff for attempt number `attempts`, or fail with
    /// [`StoreError::RetryExhausted`] once the budget is spent.
    async fn backoff_or_give_up(
        &self,
        operation: &'static str,
        name: &FileName,
        current: u64,
        attempts: u32,
    ) -> Result<(), StoreError> {
        if attempts >= self.retry.max_attempts {
            warn!(
                file = %name,
                operation,
                attempts,
                "Conflict retry budget exhausted"
            );
            return Err(StoreError::RetryExhausted {
                operation,
                attempts,
            });
        }

        let delay = self.retry.delay_for(attempts - 1);
        debug!(
            file = %name,
            operation,
            current,
            attempt = attempts,
            delay_ms = delay.as_millis() as u64,
            "Version conflict, backing off"
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Derive the directory key from a local path's final component.
fn file_name_of(path: &Path) -> Result<FileName, StoreError> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            StoreError::Domain(DomainError::InvalidFileName(format!(
                "path has no usable file name: {}",
                path.display()
            )))
        })?;
    Ok(FileName::new(name.to_string())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tempfile::TempDir;

    use tidestore_blockstore::BlockStore;
    use tidestore_core::chunker::BLOCK_SIZE;
    use tidestore_core::domain::record::FileRecord;
    use tidestore_core::placement::shard_for_hash;
    use tidestore_directory::FileTable;

    use crate::placement::DeterministicPlacement;

    struct Harness {
        engine: ReconcileEngine,
        table: Arc<FileTable>,
        stores: Vec<Arc<BlockStore>>,
        dir: TempDir,
    }

    fn harness(shard_count: u32) -> Harness {
        let table = Arc::new(FileTable::new());
        let stores: Vec<Arc<BlockStore>> = (0..shard_count)
            .map(|_| Arc::new(BlockStore::new()))
            .collect();
        let shards: Vec<Arc<dyn IBlockShard>> = stores
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn IBlockShard>)
            .collect();

        Harness {
            engine: ReconcileEngine::new(
                Arc::clone(&table) as Arc<dyn IMetadataDirectory>,
                shards,
                Arc::new(DeterministicPlacement::new(shard_count).unwrap()),
                RetryPolicy::new(4, Duration::from_millis(1)),
            ),
            table,
            stores,
            dir: TempDir::new().unwrap(),
        }
    }

    impl Harness {
        async fn write_file(&self, name: &str, data: &[u8]) -> std::path::PathBuf {
            let path = self.dir.path().join(name);
            tokio::fs::write(&path, data).await.unwrap();
            path
        }

        fn name(&self, name: &str) -> FileName {
            FileName::new(name.to_string()).unwrap()
        }
    }

    /// Directory wrapper whose first `remaining` modify/delete calls fail
    /// with a version conflict, simulating a concurrent writer.
    struct ContendedDirectory {
        inner: Arc<FileTable>,
        remaining: AtomicU32,
    }

    impl ContendedDirectory {
        fn new(inner: Arc<FileTable>, conflicts: u32) -> Self {
            Self {
                inner,
                remaining: AtomicU32::new(conflicts),
            }
        }

        fn take_conflict(&self) -> bool {
            self.remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait::async_trait]
    impl IMetadataDirectory for ContendedDirectory {
        async fn read_file(&self, name: &FileName) -> Result<FileRecord, StoreError> {
            self.inner.read_file(name).await
        }

        async fn modify_file(
            &self,
            name: &FileName,
            proposed_version: u64,
            entries: Vec<BlockRef>,
        ) -> Result<Vec<BlockRef>, StoreError> {
            if self.take_conflict() {
                return Err(StoreError::VersionConflict {
                    current: proposed_version - 1,
                });
            }
            self.inner.modify_file(name, proposed_version, entries).await
        }

        async fn delete_file(
            &self,
            name: &FileName,
            proposed_version: u64,
        ) -> Result<(), StoreError> {
            if self.take_conflict() {
                return Err(StoreError::VersionConflict {
                    current: proposed_version - 1,
                });
            }
            self.inner.delete_file(name, proposed_version).await
        }
    }

    fn contended_engine(h: &Harness, conflicts: u32) -> ReconcileEngine {
        let shards: Vec<Arc<dyn IBlockShard>> = h
            .stores
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn IBlockShard>)
            .collect();
        ReconcileEngine::new(
            Arc::new(ContendedDirectory::new(Arc::clone(&h.table), conflicts)),
            shards,
            Arc::new(DeterministicPlacement::new(h.stores.len() as u32).unwrap()),
            RetryPolicy::new(4, Duration::from_millis(1)),
        )
    }

    // ------------------------------------------------------------------
    // Upload
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_upload_creates_at_version_one() {
        let h = harness(2);
        let path = h.write_file("report.bin", &[42u8; 10_000]).await;

        let outcome = h.engine.upload(&path).await.unwrap();
        assert_eq!(outcome.version, 1);
        assert_eq!(outcome.blocks_total, 3);
        assert_eq!(outcome.blocks_pushed, 3);
        assert_eq!(outcome.attempts, 1);

        let record = h.table.read(&h.name("report.bin"));
        assert_eq!(record.version, 1);
        assert_eq!(record.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_upload_places_blocks_on_assigned_shards() {
        let h = harness(3);
        let path = h.write_file("spread.bin", &[9u8; BLOCK_SIZE * 4]).await;

        h.engine.upload(&path).await.unwrap();

        for entry in h.table.read(&h.name("spread.bin")).entries {
            assert_eq!(entry.shard, shard_for_hash(&entry.hash, 3).unwrap());
            let store = &h.stores[entry.shard.as_index()];
            assert!(store.get(&entry.hash).is_ok());
        }
    }

    #[tokio::test]
    async fn test_reupload_same_content_pushes_nothing() {
        let h = harness(2);
        let path = h.write_file("stable.bin", &[1u8; 9_000]).await;

        h.engine.upload(&path).await.unwrap();
        let second = h.engine.upload(&path).await.unwrap();

        assert_eq!(second.version, 2);
        assert_eq!(second.blocks_pushed, 0);
    }

    #[tokio::test]
    async fn test_upload_changed_tail_pushes_only_new_blocks() {
        let h = harness(2);
        let mut data = vec![0u8; BLOCK_SIZE * 2];
        let path = h.write_file("tail.bin", &data).await;
        h.engine.upload(&path).await.unwrap();

        data[BLOCK_SIZE..].fill(0xEE);
        tokio::fs::write(&path, &data).await.unwrap();
        let second = h.engine.upload(&path).await.unwrap();

        assert_eq!(second.version, 2);
        assert_eq!(second.blocks_total, 2);
        assert_eq!(second.blocks_pushed, 1);
    }

    #[tokio::test]
    async fn test_upload_repeated_block_pushed_once() {
        let h = harness(2);
        let path = h.write_file("repeat.bin", &[5u8; BLOCK_SIZE * 3]).await;

        let outcome = h.engine.upload(&path).await.unwrap();
        assert_eq!(outcome.blocks_total, 3);
        assert_eq!(outcome.blocks_pushed, 1);
    }

    #[tokio::test]
    async fn test_upload_empty_file_records_empty_entries() {
        let h = harness(2);
        let path = h.write_file("empty.bin", b"").await;

        let outcome = h.engine.upload(&path).await.unwrap();
        assert_eq!(outcome.version, 1);
        assert_eq!(outcome.blocks_total, 0);
        assert_eq!(outcome.blocks_pushed, 0);

        // An empty record is indistinguishable from a tombstone, so the
        // file reads back as not found.
        let err = h
            .engine
            .download(&h.name("empty.bin"), &h.dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_upload_missing_local_file_fails_with_io() {
        let h = harness(1);
        let err = h
            .engine
            .upload(&h.dir.path().join("nope.bin"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[tokio::test]
    async fn test_upload_retries_through_conflicts() {
        let h = harness(2);
        let path = h.write_file("contended.bin", &[3u8; 5_000]).await;

        let engine = contended_engine(&h, 2);
        let outcome = engine.upload(&path).await.unwrap();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.version, 1);
        assert_eq!(h.table.read(&h.name("contended.bin")).version, 1);
    }

    #[tokio::test]
    async fn test_upload_exhausts_retry_budget() {
        let h = harness(2);
        let path = h.write_file("livelock.bin", &[3u8; 100]).await;

        let engine = contended_engine(&h, u32::MAX);
        let err = engine.upload(&path).await.unwrap_err();

        match err {
            StoreError::RetryExhausted {
                operation,
                attempts,
            } => {
                assert_eq!(operation, "upload");
                assert_eq!(attempts, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(h.table.is_empty());
    }

    // ------------------------------------------------------------------
    // Download
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_download_round_trips_bytes() {
        let h = harness(2);
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let path = h.write_file("src.bin", &data).await;
        h.engine.upload(&path).await.unwrap();

        let dest = h.dir.path().join("dest.bin");
        let outcome = h.engine.download(&h.name("src.bin"), &dest).await.unwrap();

        assert_eq!(outcome.version, 1);
        assert_eq!(outcome.blocks_total, 3);
        assert_eq!(outcome.blocks_fetched, 3);
        assert_eq!(outcome.blocks_reused, 0);
        assert_eq!(outcome.bytes_written, data.len());
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_download_reuses_local_blocks() {
        let h = harness(2);
        let mut data = vec![0x11u8; BLOCK_SIZE * 2];
        let path = h.write_file("doc.bin", &data).await;
        h.engine.upload(&path).await.unwrap();

        let dest = h.dir.path().join("copy.bin");
        h.engine.download(&h.name("doc.bin"), &dest).await.unwrap();

        data[BLOCK_SIZE..].fill(0x22);
        tokio::fs::write(&path, &data).await.unwrap();
        h.engine.upload(&path).await.unwrap();

        let second = h.engine.download(&h.name("doc.bin"), &dest).await.unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.blocks_fetched, 1);
        assert_eq!(second.blocks_reused, 1);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_download_unchanged_file_fetches_nothing() {
        let h = harness(2);
        let data = vec![7u8; 6_000];
        let path = h.write_file("same.bin", &data).await;
        h.engine.upload(&path).await.unwrap();

        let dest = h.dir.path().join("same_copy.bin");
        h.engine.download(&h.name("same.bin"), &dest).await.unwrap();
        let again = h.engine.download(&h.name("same.bin"), &dest).await.unwrap();

        assert_eq!(again.blocks_fetched, 0);
        assert_eq!(again.blocks_reused, again.blocks_total);
    }

    #[tokio::test]
    async fn test_download_unknown_file_fails() {
        let h = harness(1);
        let err = h
            .engine
            .download(&h.name("ghost.bin"), &h.dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_download_surfaces_missing_block() {
        let h = harness(1);
        // Record a block that was never pushed to any shard.
        let hash = BlockHash::of(b"orphaned block");
        h.table
            .modify(
                &h.name("orphan.bin"),
                1,
                vec![BlockRef {
                    hash: hash.clone(),
                    shard: ShardId::new(0),
                }],
            )
            .unwrap();

        let err = h
            .engine
            .download(&h.name("orphan.bin"), &h.dir.path().join("out"))
            .await
            .unwrap_err();
        match err {
            StoreError::BlockNotFound { hash: missing } => assert_eq!(missing, hash),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_download_rejects_out_of_range_shard() {
        let h = harness(1);
        h.table
            .modify(
                &h.name("skewed.bin"),
                1,
                vec![BlockRef {
                    hash: BlockHash::of(b"somewhere else"),
                    shard: ShardId::new(7),
                }],
            )
            .unwrap();

        let err = h
            .engine
            .download(&h.name("skewed.bin"), &h.dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Protocol { .. }));
    }

    // ------------------------------------------------------------------
    // Delete and stat
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_tombstones_and_download_fails() {
        let h = harness(2);
        let path = h.write_file("gone.bin", &[8u8; 5_000]).await;
        h.engine.upload(&path).await.unwrap();

        let outcome = h.engine.delete(&h.name("gone.bin")).await.unwrap();
        assert_eq!(outcome.version, 2);
        assert_eq!(outcome.attempts, 1);

        let err = h
            .engine
            .download(&h.name("gone.bin"), &h.dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_unknown_file_fails() {
        let h = harness(1);
        let err = h.engine.delete(&h.name("ghost.bin")).await.unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_twice_fails_second_time() {
        let h = harness(2);
        let path = h.write_file("once.bin", &[1u8; 100]).await;
        h.engine.upload(&path).await.unwrap();

        h.engine.delete(&h.name("once.bin")).await.unwrap();
        let err = h.engine.delete(&h.name("once.bin")).await.unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_retries_through_conflicts() {
        let h = harness(2);
        let path = h.write_file("busy.bin", &[2u8; 100]).await;
        h.engine.upload(&path).await.unwrap();

        let engine = contended_engine(&h, 1);
        let outcome = engine.delete(&h.name("busy.bin")).await.unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.version, 2);
    }

    #[tokio::test]
    async fn test_recreate_after_delete_continues_version_chain() {
        let h = harness(2);
        let path = h.write_file("phoenix.bin", &[4u8; 4_000]).await;

        h.engine.upload(&path).await.unwrap();
        h.engine.delete(&h.name("phoenix.bin")).await.unwrap();
        let third = h.engine.upload(&path).await.unwrap();

        assert_eq!(third.version, 3);
        // The tombstone dropped the hashes, so content is pushed again.
        assert_eq!(third.blocks_pushed, 1);
    }

    #[tokio::test]
    async fn test_stat_reports_live_record() {
        let h = harness(2);
        let path = h.write_file("info.bin", &[6u8; 9_000]).await;
        h.engine.upload(&path).await.unwrap();

        let stat = h.engine.stat(&h.name("info.bin")).await.unwrap();
        assert_eq!(stat.version, 1);
        assert_eq!(stat.blocks_total, 3);
        assert!(!stat.tombstone);
    }

    #[tokio::test]
    async fn test_stat_reports_tombstone() {
        let h = harness(2);
        let path = h.write_file("late.bin", &[6u8; 100]).await;
        h.engine.upload(&path).await.unwrap();
        h.engine.delete(&h.name("late.bin")).await.unwrap();

        let stat = h.engine.stat(&h.name("late.bin")).await.unwrap();
        assert_eq!(stat.version, 2);
        assert_eq!(stat.blocks_total, 0);
        assert!(stat.tombstone);
    }

    #[tokio::test]
    async fn test_stat_unknown_file_fails() {
        let h = harness(1);
        let err = h.engine.stat(&h.name("ghost.bin")).await.unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
    }

    // ------------------------------------------------------------------
    // Retry policy
    // ------------------------------------------------------------------

    #[test]
    fn test_backoff_doubles_per_retry() {
        let policy = RetryPolicy::new(5, Duration::from_millis(50));
        assert_eq!(policy.delay_for(0), Duration::from_millis(50));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_policy_from_config_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_file_name_of_uses_base_name() {
        let name = file_name_of(Path::new("/tmp/some/dir/notes.txt")).unwrap();
        assert_eq!(name.as_str(), "notes.txt");
    }

    #[test]
    fn test_file_name_of_rejects_bare_root() {
        assert!(file_name_of(Path::new("/")).is_err());
    }
}
