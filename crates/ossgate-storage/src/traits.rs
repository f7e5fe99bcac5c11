//! Storage abstraction trait
//!
//! This module defines the StorageMode trait that every backend implements.

use crate::StorageKind;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, TryStreamExt};
use ossgate_core::models::ObjectEntry;
use ossgate_core::AppError;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Empty payload: {0}")]
    EmptyPayload(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked object body returned by downloads
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Object body consumed by streaming uploads
pub type ByteReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(format!("Object not found: {}", msg)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::EmptyPayload(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Configuration(msg),
            StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
            other @ (StorageError::UploadFailed(_)
            | StorageError::DownloadFailed(_)
            | StorageError::DeleteFailed(_)
            | StorageError::ListFailed(_)
            | StorageError::BackendError(_)) => AppError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// Implemented by the local filesystem, MinIO and OSS backends. Object names
/// passed to `download`, `delete` and the URL methods are full keys
/// (`image/2024-01-01_a.png`); uploads take the prefix and name separately.
#[async_trait]
pub trait StorageMode: Send + Sync {
    /// Backend variant
    fn kind(&self) -> StorageKind;

    /// Upload an in-memory object and return its public URL.
    async fn upload(
        &self,
        path_prefix: &str,
        object_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        if data.is_empty() {
            return Err(StorageError::EmptyPayload(object_name.to_string()));
        }
        let content_length = data.len() as u64;
        let reader: ByteReader = Box::pin(std::io::Cursor::new(data));
        self.upload_stream(
            path_prefix,
            object_name,
            content_type,
            Some(content_length),
            reader,
        )
        .await
    }

    /// Upload from a reader without buffering the whole body.
    ///
    /// `content_length` is a sizing hint; the reader is consumed until EOF.
    /// An empty reader fails with [`StorageError::EmptyPayload`] and leaves nothing behind.
    async fn upload_stream(
        &self,
        path_prefix: &str,
        object_name: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: ByteReader,
    ) -> StorageResult<String>;

    /// Download a whole object into memory.
    async fn download(&self, object_name: &str) -> StorageResult<Bytes> {
        let mut stream = self.download_stream(object_name).await?;
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.try_next().await? {
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    /// Download an object as a stream of chunks.
    async fn download_stream(&self, object_name: &str) -> StorageResult<ByteStream>;

    /// Delete an object. Returns `false` when there was nothing to delete.
    async fn delete(&self, object_name: &str) -> StorageResult<bool>;

    async fn exists(&self, object_name: &str) -> StorageResult<bool>;

    /// Default access URL: the public URL for local storage, a presigned GET
    /// URL with the configured expiry for remote buckets.
    async fn object_url(&self, object_name: &str) -> StorageResult<String>;

    /// Presigned GET URL valid for `expires_in`. Local storage has no expiry
    /// semantics and returns its public URL.
    async fn presigned_url(&self, object_name: &str, expires_in: Duration)
        -> StorageResult<String>;

    /// Unsigned URL for an object that is expected to be publicly readable.
    async fn public_url(&self, object_name: &str) -> StorageResult<String>;

    /// List objects under `prefix`, at most `max_keys` of them (backend default
    /// when `None`). With `include_subdirs` nested objects are returned as a
    /// flattened list; without it only direct children are returned.
    async fn list_objects(
        &self,
        prefix: &str,
        max_keys: Option<usize>,
        include_subdirs: bool,
    ) -> StorageResult<Vec<ObjectEntry>>;
}
