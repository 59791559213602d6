//! Wire-level tests for the directory HTTP adapter
//!
//! Scripts directory responses with wiremock and verifies the adapter's
//! translation in both directions: request shape on the way out, typed
//! errors on the way back.

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tidestore_client::DirectoryClient;
use tidestore_core::domain::errors::StoreError;
use tidestore_core::domain::newtypes::{BlockHash, FileName, ShardId};
use tidestore_core::domain::record::BlockRef;

fn name(s: &str) -> FileName {
    FileName::new(s.to_string()).unwrap()
}

#[tokio::test]
async fn test_read_parses_record() {
    let server = MockServer::start().await;
    let hash = BlockHash::of(b"first block");

    Mock::given(method("GET"))
        .and(path("/v1/files/doc.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "version": 3,
            "entries": [{"hash": hash.as_str(), "shard": 1}]
        })))
        .mount(&server)
        .await;

    let client = DirectoryClient::with_base_url(server.uri());
    let record = client.read(&name("doc.txt")).await.unwrap();

    assert_eq!(record.version, 3);
    assert_eq!(record.entries.len(), 1);
    assert_eq!(record.entries[0].hash, hash);
    assert_eq!(record.entries[0].shard, ShardId::new(1));
}

#[tokio::test]
async fn test_read_absent_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/files/ghost.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"version": 0, "entries": []})),
        )
        .mount(&server)
        .await;

    let client = DirectoryClient::with_base_url(server.uri());
    let record = client.read(&name("ghost.txt")).await.unwrap();
    assert!(record.is_absent());
}

#[tokio::test]
async fn test_modify_sends_version_and_entries() {
    let server = MockServer::start().await;
    let hash = BlockHash::of(b"payload");

    Mock::given(method("PUT"))
        .and(path("/v1/files/doc.txt"))
        .and(body_json(serde_json::json!({
            "version": 1,
            "entries": [{"hash": hash.as_str(), "shard": 0}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "missing": [{"hash": hash.as_str(), "shard": 0}]
        })))
        .mount(&server)
        .await;

    let client = DirectoryClient::with_base_url(server.uri());
    let missing = client
        .modify(
            &name("doc.txt"),
            1,
            vec![BlockRef {
                hash: hash.clone(),
                shard: ShardId::new(0),
            }],
        )
        .await
        .unwrap();

    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].hash, hash);
}

#[tokio::test]
async fn test_modify_conflict_carries_current_version() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/files/doc.txt"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "code": "version_conflict",
            "message": "proposed version must be 8",
            "current_version": 7
        })))
        .mount(&server)
        .await;

    let client = DirectoryClient::with_base_url(server.uri());
    let err = client.modify(&name("doc.txt"), 3, vec![]).await.unwrap_err();

    assert!(matches!(err, StoreError::VersionConflict { current: 7 }));
}

#[tokio::test]
async fn test_conflict_without_current_version_is_protocol_violation() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/files/doc.txt"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "code": "version_conflict",
            "message": "conflict"
        })))
        .mount(&server)
        .await;

    let client = DirectoryClient::with_base_url(server.uri());
    let err = client.modify(&name("doc.txt"), 3, vec![]).await.unwrap_err();
    assert!(matches!(err, StoreError::Protocol { .. }));
}

#[tokio::test]
async fn test_delete_not_found_maps_to_file_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/files/ghost.txt"))
        .and(body_json(serde_json::json!({"version": 1})))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "not_found",
            "message": "no such file: ghost.txt"
        })))
        .mount(&server)
        .await;

    let client = DirectoryClient::with_base_url(server.uri());
    let err = client.delete(&name("ghost.txt"), 1).await.unwrap_err();

    match err {
        StoreError::FileNotFound { name } => assert_eq!(name, "ghost.txt"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_record_body_maps_to_protocol() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/files/doc.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = DirectoryClient::with_base_url(server.uri());
    let err = client.read(&name("doc.txt")).await.unwrap_err();
    assert!(matches!(err, StoreError::Protocol { .. }));
}

#[tokio::test]
async fn test_unreachable_directory_maps_to_transport() {
    // Nothing listens on port 1.
    let client = DirectoryClient::with_base_url("http://127.0.0.1:1");
    let err = client.read(&name("doc.txt")).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport { .. }));
}
