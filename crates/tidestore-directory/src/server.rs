//! HTTP front of the file table
//!
//! Routes:
//! - `GET /v1/files/{name}` - current record (absent reads as version 0)
//! - `PUT /v1/files/{name}` - optimistic modify, returns missing entries
//! - `DELETE /v1/files/{name}` - optimistic delete, leaves a tombstone
//! - `GET /healthz` - liveness
//!
//! Conflict and not-found outcomes travel as the JSON error envelope from
//! `tidestore-proto` under their mapped status codes.

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
use tidestore_core::domain::newtypes::FileName;
use tidestore_proto::routes;
use tidestore_proto::wire::{DeleteRequest, ErrorBody, ModifyRequest, ModifyResponse};

use crate::table::FileTable;

/// HTTP server exposing one [`FileTable`]
pub struct DirectoryServer {
    table: Arc<FileTable>,
    listener: TcpListener,
}

impl DirectoryServer {
    /// Bind the listening socket.
    ///
    /// Binding is separate from serving so callers (and tests binding port
    /// 0) can learn the local address before the accept loop starts.
    pub async fn bind(table: Arc<FileTable>, endpoint: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(endpoint)
            .await
            .with_context(|| format!("Failed to bind directory server on {endpoint}"))?;
        Ok(Self { table, listener })
    }

    /// The bound local address.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the cancellation token fires.
    pub async fn run(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        info!(addr = %self.local_addr()?, "Directory server listening");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    let (stream, _) = result?;
                    let io = TokioIo::new(stream);
                    let table = Arc::clone(&self.table);

                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            handle_request(req, Arc::clone(&table))
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            error!(error = %e, "Directory HTTP connection error");
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    info!("Directory server shutting down");
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
    table: Arc<FileTable>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::GET && path == routes::HEALTH_PATH {
        return Ok(text_response(StatusCode::OK, "ok"));
    }

    let Some(segment) = routes::parse_file_path(&path) else {
        return Ok(text_response(StatusCode::NOT_FOUND, "Not Found"));
    };

    let name = match FileName::new(segment.to_string()) {
        Ok(name) => name,
        Err(e) => {
            return Ok(json_response(
                StatusCode::BAD_REQUEST,
                &ErrorBody::bad_request(e.to_string()),
            ))
        }
    };

    if method == Method::GET {
        let record = table.read(&name);
        debug!(file = %name, version = record.version, "Read");
        return Ok(json_response(StatusCode::OK, &record));
    }

    if method == Method::PUT {
        let body = req.into_body().collect().await?.to_bytes();
        let modify: ModifyRequest = match serde_json::from_slice(&body) {
            Ok(modify) => modify,
            Err(e) => {
                return Ok(json_response(
                    StatusCode::BAD_REQUEST,
                    &ErrorBody::bad_request(format!("invalid modify body: {e}")),
                ))
            }
        };

        return Ok(match table.modify(&name, modify.version, modify.entries) {
            Ok(missing) => {
                info!(
                    file = %name,
                    version = modify.version,
                    missing = missing.len(),
                    "File record updated"
                );
                json_response(StatusCode::OK, &ModifyResponse { missing })
            }
            Err(e) => error_response(&e),
        });
    }

    if method == Method::DELETE {
        let body = req.into_body().collect().await?.to_bytes();
        let delete: DeleteRequest = match serde_json::from_slice(&body) {
            Ok(delete) => delete,
            Err(e) => {
                return Ok(json_response(
                    StatusCode::BAD_REQUEST,
                    &ErrorBody::bad_request(format!("invalid delete body: {e}")),
                ))
            }
        };

        return Ok(match table.delete(&name, delete.version) {
            Ok(()) => {
                info!(file = %name, version = delete.version, "File tombstoned");
                json_response(StatusCode::OK, &serde_json::json!({}))
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

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn error_response(err: &StoreError) -> Response<Full<Bytes>> {
    let body = match err {
        StoreError::VersionConflict { current } => ErrorBody::version_conflict(*current),
        StoreError::FileNotFound { name } => ErrorBody::not_found(name),
        StoreError::BlockNotFound { hash } => ErrorBody::block_not_found(hash.as_str()),
        other => ErrorBody::bad_request(other.to_string()),
    };
    let status =
        StatusCode::from_u16(body.code.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
    json_response(status, &body)
}
