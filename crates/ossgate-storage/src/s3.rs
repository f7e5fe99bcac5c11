//! S3-protocol plumbing shared by the MinIO and OSS backends.

use crate::traits::{ByteReader, ByteStream, StorageError, StorageResult};
use futures::StreamExt;
use http::Method;
use object_store::aws::AmazonS3;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, Attributes, ObjectMeta, ObjectStore, ObjectStoreExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Upload size below which a single PUT is used instead of a multipart upload.
const SINGLE_PUT_THRESHOLD: usize = 10 * 1024 * 1024;
const MAX_SINGLE_PUT: usize = 64 * 1024 * 1024;

/// A bucket reached through `object_store`'s S3 client.
#[derive(Clone, Debug)]
pub(crate) struct S3Bucket {
    store: Arc<AmazonS3>,
    bucket: String,
    backend: &'static str,
}

/// Return a required profile field or a configuration error naming it.
pub(crate) fn required_field<'a>(
    value: &'a Option<String>,
    field: &str,
    code: &str,
) -> StorageResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StorageError::ConfigError(format!(
            "{} profile is missing {}",
            code, field
        ))),
    }
}

fn map_get_error(key: &str, err: ObjectStoreError) -> StorageError {
    match err {
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
        other => StorageError::DownloadFailed(other.to_string()),
    }
}

impl S3Bucket {
    pub(crate) fn new(store: AmazonS3, bucket: String, backend: &'static str) -> Self {
        Self {
            store: Arc::new(store),
            bucket,
            backend,
        }
    }

    pub(crate) fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Stream `reader` into `key`. Returns the number of bytes written.
    pub(crate) async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        mut reader: ByteReader,
    ) -> StorageResult<u64> {
        let start = std::time::Instant::now();
        let location = Path::from(key);

        let capacity = content_length
            .map(|len| (len as usize).saturating_add(1).min(MAX_SINGLE_PUT))
            .unwrap_or(SINGLE_PUT_THRESHOLD);

        let mut attributes = Attributes::new();
        if !content_type.trim().is_empty() {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }

        let store: Arc<dyn ObjectStore> = self.store.clone();
        let mut writer =
            BufWriter::with_capacity(store, location, capacity).with_attributes(attributes);

        let written = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(written) => written,
            Err(e) => {
                let _ = writer.abort().await;
                tracing::error!(
                    error = %e,
                    backend = self.backend,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object upload failed"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        };

        if written == 0 {
            let _ = writer.abort().await;
            return Err(StorageError::EmptyPayload(key.to_string()));
        }

        writer.shutdown().await.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = self.backend,
                bucket = %self.bucket,
                key = %key,
                size_bytes = written,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            backend = self.backend,
            bucket = %self.bucket,
            key = %key,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(written)
    }

    pub(crate) async fn get_stream(&self, key: &str) -> StorageResult<ByteStream> {
        let start = std::time::Instant::now();
        let location = Path::from(key);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| map_get_error(key, e))?;

        let backend = self.backend;
        let bucket = self.bucket.clone();
        let key = key.to_string();

        let stream = result.into_stream().map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    backend,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object stream download error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        Ok(Box::pin(stream))
    }

    pub(crate) async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key);
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    /// Delete `key`. S3 deletes are idempotent, so absence is checked with a head request first.
    pub(crate) async fn delete(&self, key: &str) -> StorageResult<bool> {
        if !self.exists(key).await? {
            tracing::debug!(backend = self.backend, key = %key, "Object delete: object absent");
            return Ok(false);
        }

        let start = std::time::Instant::now();
        let location = Path::from(key);

        self.store.delete(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                backend = self.backend,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            backend = self.backend,
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object delete successful"
        );

        Ok(true)
    }

    pub(crate) async fn presigned_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = Path::from(key);
        let url = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        Ok(url.to_string())
    }

    /// List objects under a non-blank `prefix`, recursing when `include_subdirs` is set.
    pub(crate) async fn list(
        &self,
        prefix: &str,
        max_keys: usize,
        include_subdirs: bool,
    ) -> StorageResult<Vec<ObjectMeta>> {
        let prefix_path = Path::from(prefix);

        let objects = if include_subdirs {
            let mut stream = self.store.list(Some(&prefix_path));
            let mut objects = Vec::new();
            while objects.len() < max_keys {
                match stream.next().await {
                    Some(meta) => {
                        objects.push(meta.map_err(|e| StorageError::ListFailed(e.to_string()))?)
                    }
                    None => break,
                }
            }
            objects
        } else {
            let mut listing = self
                .store
                .list_with_delimiter(Some(&prefix_path))
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            listing.objects.truncate(max_keys);
            listing.objects
        };

        tracing::debug!(
            backend = self.backend,
            bucket = %self.bucket,
            prefix = %prefix,
            include_subdirs,
            count = objects.len(),
            "Object listing"
        );

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field() {
        let present = Some("http://minio:9000".to_string());
        let blank = Some("  ".to_string());
        assert_eq!(
            required_field(&present, "endpoint", "minio").unwrap(),
            "http://minio:9000"
        );
        let err = required_field(&blank, "endpoint", "minio").unwrap_err();
        assert!(err.to_string().contains("endpoint"));
        assert!(required_field(&None, "bucketName", "oss").is_err());
    }
}
