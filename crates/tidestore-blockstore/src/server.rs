//! HTTP front of the block store
//!
//! Routes:
//! - `PUT /v1/blocks/{hash}` - store raw block bytes under their digest
//! - `GET /v1/blocks/{hash}` - fetch raw block bytes
//! - `GET /v1/ping` - reachability probe used for latency measurement
//! - `GET /healthz` - liveness
//!
//! Block bodies travel as `application/octet-stream`; everything else
//! is JSON.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use tidestore_core::domain::errors::StoreError;
use tidestore_core::domain::newtypes::BlockHash;
use tidestore_proto::routes;
use tidestore_proto::wire::{ErrorBody, PutBlockResponse};

use crate::store::BlockStore;

/// HTTP server exposing one [`BlockStore`]
pub struct BlockShardServer {
    store: Arc<BlockStore>,
    listener: TcpListener,
}

impl BlockShardServer {
    /// Bind the listening socket without starting the accept loop.
    pub async fn bind(store: Arc<BlockStore>, endpoint: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(endpoint)
            .await
            .with_context(|| format!("Failed to bind block shard on {endpoint}"))?;
        Ok(Self { store, listener })
    }

    /// The bound local address.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the cancellation token fires.
    pub async fn run(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        info!(addr = %self.local_addr()?, "Block shard listening");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    let (stream, _) = result?;
                    let io = TokioIo::new(stream);
                    let store = Arc::clone(&self.store);

                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            handle_request(req, Arc::clone(&store))
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            error!(error = %e, "Block shard HTTP connection error");
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    info!("Block shard shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Handle a single HTTP request.
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    store: Arc<BlockStore>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::GET && (path == routes::HEALTH_PATH || path == routes::PING_PATH) {
        return Ok(text_response(StatusCode::OK, "ok"));
    }

    let Some(segment) = routes::parse_block_path(&path) else {
        return Ok(text_response(StatusCode::NOT_FOUND, "Not Found"));
    };

    let hash = match BlockHash::new(segment.to_string()) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(json_response(
                StatusCode::BAD_REQUEST,
                &ErrorBody::bad_request(e.to_string()),
            ))
        }
    };

    if method == Method::GET {
        return Ok(match store.get(&hash) {
            Ok(bytes) => {
                debug!(hash = %hash, len = bytes.len(), "Block served");
                octets_response(bytes)
            }
            Err(e) => error_response(&e),
        });
    }

    if method == Method::PUT {
        let bytes = req.into_body().collect().await?.to_bytes().to_vec();

        return Ok(match store.put(&hash, bytes) {
            Ok(created) => {
                debug!(hash = %hash, created, "Block stored");
                json_response(StatusCode::OK, &PutBlockResponse { created })
            }
            Err(e) => error_response(&e),
        });
    }

    Ok(text_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
    ))
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(bytes)))
        .unwrap()
}

fn octets_response(bytes: Vec<u8>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/octet-stream")
        .body(Full::new(Bytes::from(bytes)))
        .unwrap()
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn error_response(err: &StoreError) -> Response<Full<Bytes>> {
    let body = match err {
        StoreError::BlockNotFound { hash } => ErrorBody::block_not_found(hash.as_str()),
        other => ErrorBody::bad_request(other.to_string()),
    };
    let status =
        StatusCode::from_u16(body.code.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
    json_response(status, &body)
}
