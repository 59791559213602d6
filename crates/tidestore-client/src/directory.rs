//! HTTP client for the metadata directory
//!
//! Typed wrapper over `reqwest` that speaks the directory's JSON wire
//! protocol and translates its error envelope back into [`StoreError`]
//! variants. A version conflict arrives as HTTP 409 carrying the
//! directory's current version; the engine branches on it, so it must
//! survive the trip as [`StoreError::VersionConflict`] rather than a
//! status-code string.

use reqwest::{Client, Response};
use tracing::debug;

use tidestore_core::domain::errors::StoreError;
use tidestore_core::domain::newtypes::FileName;
use tidestore_core::domain::record::{BlockRef, FileRecord};
use tidestore_core::ports::IMetadataDirectory;
use tidestore_proto::routes;
use tidestore_proto::wire::{DeleteRequest, ErrorBody, ErrorCode, ModifyRequest, ModifyResponse};

/// HTTP client for one metadata directory server
pub struct DirectoryClient {
    client: Client,
    base_url: String,
}

impl DirectoryClient {
    /// Creates a client for a directory at `host:port`.
    pub fn new(endpoint: &str) -> Self {
        Self::with_base_url(format!("http://{endpoint}"))
    }

    /// Creates a client with a full base URL (useful for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Returns the base URL requests are built against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reads the current record for `name`.
    ///
    /// Unknown names are not an error: the directory answers with an
    /// absent record at version 0.
    pub async fn read(&self, name: &FileName) -> Result<FileRecord, StoreError> {
        let url = self.url(&routes::file_path(name));
        debug!(file = %name, "Reading file record");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::transport(format!("read {name} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(error_from(name, response).await);
        }

        response
            .json::<FileRecord>()
            .await
            .map_err(|e| StoreError::protocol(format!("invalid record body for {name}: {e}")))
    }

    /// Proposes `{proposed_version, entries}` as the new record for
    /// `name`. On success returns the entries the directory had no prior
    /// hash for.
    pub async fn modify(
        &self,
        name: &FileName,
        proposed_version: u64,
        entries: Vec<BlockRef>,
    ) -> Result<Vec<BlockRef>, StoreError> {
        let url = self.url(&routes::file_path(name));
        debug!(file = %name, version = proposed_version, "Submitting file record");

        let body = ModifyRequest {
            version: proposed_version,
            entries,
        };

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::transport(format!("modify {name} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(error_from(name, response).await);
        }

        let body: ModifyResponse = response
            .json()
            .await
            .map_err(|e| StoreError::protocol(format!("invalid modify body for {name}: {e}")))?;
        Ok(body.missing)
    }

    /// Proposes a tombstone at `proposed_version` for `name`.
    pub async fn delete(&self, name: &FileName, proposed_version: u64) -> Result<(), StoreError> {
        let url = self.url(&routes::file_path(name));
        debug!(file = %name, version = proposed_version, "Submitting tombstone");

        let body = DeleteRequest {
            version: proposed_version,
        };

        let response = self
            .client
            .delete(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::transport(format!("delete {name} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(error_from(name, response).await);
        }

        Ok(())
    }
}

/// Translate a non-success directory response into a [`StoreError`].
async fn error_from(name: &FileName, response: Response) -> StoreError {
    let status = response.status();

    match response.json::<ErrorBody>().await {
        Ok(body) => match body.code {
            ErrorCode::VersionConflict => match body.current_version {
                Some(current) => StoreError::VersionConflict { current },
                None => StoreError::protocol("conflict response without current_version"),
            },
            ErrorCode::NotFound => StoreError::FileNotFound {
                name: name.to_string(),
            },
            _ => StoreError::protocol(format!("directory returned {status}: {}", body.message)),
        },
        Err(_) => StoreError::protocol(format!("directory returned {status} with opaque body")),
    }
}

#[async_trait::async_trait]
impl IMetadataDirectory for DirectoryClient {
    async fn read_file(&self, name: &FileName) -> Result<FileRecord, StoreError> {
        self.read(name).await
    }

    async fn modify_file(
        &self,
        name: &FileName,
        proposed_version: u64,
        entries: Vec<BlockRef>,
    ) -> Result<Vec<BlockRef>, StoreError> {
        self.modify(name, proposed_version, entries).await
    }

    async fn delete_file(&self, name: &FileName, proposed_version: u64) -> Result<(), StoreError> {
        self.delete(name, proposed_version).await
    }
}
