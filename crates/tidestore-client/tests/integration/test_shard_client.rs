//! Wire-level tests for the shard HTTP adapter

use wiremock::matchers::{body_bytes, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tidestore_client::ShardClient;
use tidestore_core::domain::errors::StoreError;
use tidestore_core::domain::newtypes::{BlockHash, ShardId};

#[tokio::test]
async fn test_put_block_sends_raw_octets() {
    let server = MockServer::start().await;
    let bytes = b"block payload".to_vec();
    let hash = BlockHash::of(&bytes);

    Mock::given(method("PUT"))
        .and(path(format!("/v1/blocks/{hash}")))
        .and(body_bytes(bytes.clone()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"created": true})),
        )
        .mount(&server)
        .await;

    let client = ShardClient::with_base_url(ShardId::new(0), server.uri());
    assert!(client.put_block(&hash, bytes).await.unwrap());
}

#[tokio::test]
async fn test_put_existing_block_reports_not_created() {
    let server = MockServer::start().await;
    let bytes = b"already there".to_vec();
    let hash = BlockHash::of(&bytes);

    Mock::given(method("PUT"))
        .and(path(format!("/v1/blocks/{hash}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"created": false})),
        )
        .mount(&server)
        .await;

    let client = ShardClient::with_base_url(ShardId::new(0), server.uri());
    assert!(!client.put_block(&hash, bytes).await.unwrap());
}

#[tokio::test]
async fn test_fetch_block_returns_bytes() {
    let server = MockServer::start().await;
    let bytes = b"stored content".to_vec();
    let hash = BlockHash::of(&bytes);

    Mock::given(method("GET"))
        .and(path(format!("/v1/blocks/{hash}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(bytes.clone())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let client = ShardClient::with_base_url(ShardId::new(0), server.uri());
    assert_eq!(client.fetch_block(&hash).await.unwrap(), bytes);
}

#[tokio::test]
async fn test_fetch_missing_block_maps_to_block_not_found() {
    let server = MockServer::start().await;
    let hash = BlockHash::of(b"never stored");

    Mock::given(method("GET"))
        .and(path(format!("/v1/blocks/{hash}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "block_not_found",
            "message": format!("no such block: {hash}")
        })))
        .mount(&server)
        .await;

    let client = ShardClient::with_base_url(ShardId::new(0), server.uri());
    let err = client.fetch_block(&hash).await.unwrap_err();

    match err {
        StoreError::BlockNotFound { hash: missing } => assert_eq!(missing, hash),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_rejected_put_maps_to_protocol() {
    let server = MockServer::start().await;
    let hash = BlockHash::of(b"declared");

    Mock::given(method("PUT"))
        .and(path(format!("/v1/blocks/{hash}")))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "bad_request",
            "message": "block bytes hash to something else"
        })))
        .mount(&server)
        .await;

    let client = ShardClient::with_base_url(ShardId::new(0), server.uri());
    let err = client.put_block(&hash, b"other".to_vec()).await.unwrap_err();
    assert!(matches!(err, StoreError::Protocol { .. }));
}

#[tokio::test]
async fn test_ping_measures_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = ShardClient::with_base_url(ShardId::new(0), server.uri());
    let rtt = client.measure_ping().await.unwrap();
    assert!(rtt > std::time::Duration::ZERO);
}

#[tokio::test]
async fn test_unreachable_shard_maps_to_transport() {
    let client = ShardClient::with_base_url(ShardId::new(0), "http://127.0.0.1:1");
    let err = client.measure_ping().await.unwrap_err();
    assert!(matches!(err, StoreError::Transport { .. }));
}
