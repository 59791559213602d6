//! End-to-end reconciliation over real HTTP servers
//!
//! Each test starts an in-process cluster on ephemeral ports and drives
//! it through the full client stack: chunker, placement, directory and
//! shard adapters, reconciliation engine.

use std::sync::Arc;

use tempfile::TempDir;

use tidestore_client::{DirectoryClient, NearestShardPlacement};
use tidestore_core::domain::errors::StoreError;
use tidestore_core::domain::newtypes::FileName;
use tidestore_core::placement::shard_for_hash;

use crate::common::Cluster;

fn name(s: &str) -> FileName {
    FileName::new(s.to_string()).unwrap()
}

fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[tokio::test]
async fn test_full_lifecycle_over_http() {
    let cluster = Cluster::start(2).await;
    let engine = cluster.engine();
    let dir = TempDir::new().unwrap();

    let data = sample_bytes(10_000);
    let source = dir.path().join("report.bin");
    tokio::fs::write(&source, &data).await.unwrap();

    // Upload: 10000 bytes chunk into 4096 + 4096 + 1808.
    let upload = engine.upload(&source).await.unwrap();
    assert_eq!(upload.version, 1);
    assert_eq!(upload.blocks_total, 3);
    assert_eq!(upload.blocks_pushed, 3);

    // Unchanged re-upload bumps the version but moves no bytes.
    let again = engine.upload(&source).await.unwrap();
    assert_eq!(again.version, 2);
    assert_eq!(again.blocks_pushed, 0);

    // Download into a fresh path reproduces the bytes.
    let dest = dir.path().join("fetched.bin");
    let download = engine.download(&name("report.bin"), &dest).await.unwrap();
    assert_eq!(download.version, 2);
    assert_eq!(download.blocks_fetched, 3);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), data);

    // Delete tombstones the record; the name reads as gone but keeps
    // its version history.
    let delete = engine.delete(&name("report.bin")).await.unwrap();
    assert_eq!(delete.version, 3);

    let err = engine
        .download(&name("report.bin"), &dest)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::FileNotFound { .. }));

    let stat = engine.stat(&name("report.bin")).await.unwrap();
    assert_eq!(stat.version, 3);
    assert!(stat.tombstone);
}

#[tokio::test]
async fn test_blocks_land_on_hash_assigned_shards() {
    let cluster = Cluster::start(3).await;
    let engine = cluster.engine();
    let dir = TempDir::new().unwrap();

    let source = dir.path().join("spread.bin");
    tokio::fs::write(&source, sample_bytes(20_000)).await.unwrap();
    engine.upload(&source).await.unwrap();

    let directory = DirectoryClient::with_base_url(cluster.directory_url.clone());
    let record = directory.read(&name("spread.bin")).await.unwrap();
    assert_eq!(record.entries.len(), 5);

    let set = cluster.shard_set();
    for entry in &record.entries {
        assert_eq!(entry.shard, shard_for_hash(&entry.hash, 3).unwrap());
        // The block must be fetchable from exactly the recorded shard.
        let shard = set.get(entry.shard).unwrap();
        assert!(shard.fetch_block(&entry.hash).await.is_ok());
    }
}

#[tokio::test]
async fn test_nearest_placement_sends_everything_to_one_shard() {
    let cluster = Cluster::start(3).await;
    let placement = Arc::new(NearestShardPlacement::new(cluster.shard_set().clients()));
    let engine = cluster.engine_with(placement);
    let dir = TempDir::new().unwrap();

    let data = sample_bytes(12_000);
    let source = dir.path().join("near.bin");
    tokio::fs::write(&source, &data).await.unwrap();
    engine.upload(&source).await.unwrap();

    let directory = DirectoryClient::with_base_url(cluster.directory_url.clone());
    let record = directory.read(&name("near.bin")).await.unwrap();
    let first = record.entries[0].shard;
    assert!(record.entries.iter().all(|e| e.shard == first));

    // Download follows the recorded shard, not the strategy.
    let dest = dir.path().join("near_copy.bin");
    engine.download(&name("near.bin"), &dest).await.unwrap();
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), data);
}

#[tokio::test]
async fn test_racing_uploads_serialize_through_version_gate() {
    let cluster = Cluster::start(2).await;
    let dir = TempDir::new().unwrap();

    let path_a = dir.path().join("a").join("shared.bin");
    let path_b = dir.path().join("b").join("shared.bin");
    tokio::fs::create_dir_all(path_a.parent().unwrap()).await.unwrap();
    tokio::fs::create_dir_all(path_b.parent().unwrap()).await.unwrap();
    tokio::fs::write(&path_a, sample_bytes(5_000)).await.unwrap();
    tokio::fs::write(&path_b, vec![0xAB; 5_000]).await.unwrap();

    let engine_a = cluster.engine();
    let engine_b = cluster.engine();

    let (a, b) = tokio::join!(engine_a.upload(&path_a), engine_b.upload(&path_b));
    let (a, b) = (a.unwrap(), b.unwrap());

    // Both must land, on distinct consecutive versions.
    let mut versions = [a.version, b.version];
    versions.sort_unstable();
    assert_eq!(versions, [1, 2]);

    let stat = cluster.engine().stat(&name("shared.bin")).await.unwrap();
    assert_eq!(stat.version, 2);
}
