//! Object storage for uploaded media.
//!
//! Files are written with an authenticated `PUT {endpoint}/{pathname}` and
//! served from `{public_base_url}/{pathname}`.

use async_trait::async_trait;
use axum::body::Bytes;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{StorageConfig, StorageProvider};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_FILENAME_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Blob storage disabled")]
    Disabled,

    #[error("File exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Upload request failed: {0}")]
    Transport(String),

    #[error("Storage responded with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Result of a successful upload, returned to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlob {
    pub url: String,
    pub pathname: String,
    pub content_type: String,
    pub size: usize,
}

/// Writes public objects.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, pathname: &str, content_type: &str, bytes: Bytes) -> Result<StoredBlob, BlobError>;
}

/// Used when `storage.provider = "disabled"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledBlobStore;

#[async_trait]
impl BlobStore for DisabledBlobStore {
    async fn put(&self, _pathname: &str, _content_type: &str, _bytes: Bytes) -> Result<StoredBlob, BlobError> {
        Err(BlobError::Disabled)
    }
}

/// HTTP object storage with a bearer token.
#[derive(Clone)]
pub struct HttpBlobStore {
    endpoint: String,
    token: String,
    public_base_url: String,
    client: reqwest::Client,
}

impl HttpBlobStore {
    pub fn new(config: &StorageConfig) -> Result<Self, BlobError> {
        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|e| BlobError::Transport(e.to_string()))?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let public_base_url = if config.public_base_url.is_empty() {
            endpoint.clone()
        } else {
            config.public_base_url.trim_end_matches('/').to_string()
        };

        Ok(Self {
            endpoint,
            token: config.token.clone(),
            public_base_url,
            client,
        })
    }

    pub fn public_url(&self, pathname: &str) -> String {
        format!("{}/{}", self.public_base_url, pathname)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, pathname: &str, content_type: &str, bytes: Bytes) -> Result<StoredBlob, BlobError> {
        let size = bytes.len();
        let mut request = self
            .client
            .put(format!("{}/{}", self.endpoint, pathname))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BlobError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(StoredBlob {
            url: self.public_url(pathname),
            pathname: pathname.to_string(),
            content_type: content_type.to_string(),
            size,
        })
    }
}

/// Store selected by configuration.
pub fn from_config(config: &StorageConfig) -> Result<std::sync::Arc<dyn BlobStore>, BlobError> {
    Ok(match config.provider {
        StorageProvider::Disabled => std::sync::Arc::new(DisabledBlobStore),
        StorageProvider::Http => std::sync::Arc::new(HttpBlobStore::new(config)?),
    })
}

/// Keeps `[A-Za-z0-9._-]`, replaces everything else with `_` and drops
/// leading dots. `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return None;
    }

    let cleaned = if cleaned.len() > MAX_FILENAME_LEN {
        &cleaned[cleaned.len() - MAX_FILENAME_LEN..]
    } else {
        cleaned
    };
    Some(cleaned.to_string())
}

/// `uploads/<uuid>-<filename>`; the uuid keeps names from colliding.
pub fn object_path(sanitized: &str) -> String {
    format!("uploads/{}-{}", Uuid::new_v4(), sanitized)
}

/// Content type of the multipart part, else guessed from the extension.
pub fn content_type_for(declared: Option<&str>, filename: &str) -> String {
    match declared.map(str::trim) {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
        _ => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}
