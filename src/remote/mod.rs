mod envelope;
mod http;

pub use envelope::{ErrorBody, UploadBody};
pub use http::HttpRemote;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connect, DNS, timeout or abort. No response body was received.
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Server error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },
    /// A body could not be encoded, or a response did not have the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The caller's file could not be turned into a request part. Nothing was sent.
    #[error("Invalid file: {0}")]
    InvalidFile(String),
}

impl RemoteError {
    /// The message the backend put in a failure body, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RemoteError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Where an asset upload is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// `POST /upload/image`
    Image,
    /// `POST /upload/post-images`, scoped to an existing post.
    PostImages { post_id: String },
}

impl UploadTarget {
    pub fn path(&self) -> &'static str {
        match self {
            UploadTarget::Image => "/upload/image",
            UploadTarget::PostImages { .. } => "/upload/post-images",
        }
    }
}

/// A file handed over by the caller for upload. Type and size policy is the caller's concern.
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl AssetFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let content_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(Self {
            file_name,
            content_type,
            bytes: Bytes::from(data),
        })
    }
}

/// URL of an uploaded asset, as returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
}

/// The primitive REST operations against one backend.
/// Each call is exactly one HTTP round trip: no retries, no caching.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn list(&self, path: &str) -> Result<Vec<Value>, RemoteError>;
    async fn get_by_id(&self, path: &str, id: &str) -> Result<Value, RemoteError>;
    async fn create(&self, path: &str, body: Value) -> Result<Value, RemoteError>;
    async fn update_partial(&self, path: &str, id: &str, body: Value)
        -> Result<Value, RemoteError>;
    async fn delete(&self, path: &str, id: &str) -> Result<(), RemoteError>;
    async fn upload_file(
        &self,
        target: &UploadTarget,
        file: AssetFile,
    ) -> Result<UploadResult, RemoteError>;
}
