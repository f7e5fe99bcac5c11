use crate::keys::{join_url, listing_prefix, object_key, validate_key};
use crate::listing::object_entry;
use crate::s3::{required_field, S3Bucket};
use crate::traits::{ByteReader, ByteStream, StorageError, StorageMode, StorageResult};
use crate::StorageKind;
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use ossgate_core::models::{ObjectEntry, StorageProfile};
use std::time::Duration;

const DEFAULT_REGION: &str = "us-east-1";

/// MinIO storage over path-style S3 requests
#[derive(Clone, Debug)]
pub struct MinioStorage {
    bucket: S3Bucket,
    host: String,
    default_expiry: Duration,
}

impl MinioStorage {
    /// Build a client from the `minio` profile.
    ///
    /// `endpoint`, `accessKey`, `secretKey` and `bucketName` are required.
    /// `host` falls back to the endpoint when blank.
    pub fn from_profile(profile: &StorageProfile, default_expiry: Duration) -> StorageResult<Self> {
        let code = StorageKind::Minio.code();
        let endpoint = required_field(&profile.endpoint, "endpoint", code)?;
        let access_key = required_field(&profile.access_key, "accessKey", code)?;
        let secret_key = required_field(&profile.secret_key, "secretKey", code)?;
        let bucket_name = required_field(&profile.bucket_name, "bucketName", code)?;
        let region = profile
            .region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REGION);

        let store = AmazonS3Builder::new()
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"))
            .with_region(region)
            .with_bucket_name(bucket_name)
            .with_access_key_id(access_key)
            .with_secret_access_key(secret_key)
            .with_virtual_hosted_style_request(false)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let host = profile
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(endpoint)
            .to_string();

        Ok(Self {
            bucket: S3Bucket::new(store, bucket_name.to_string(), code),
            host,
            default_expiry,
        })
    }

    /// `{host}/{bucket}/{key}`
    fn generate_url(&self, key: &str) -> String {
        join_url(&join_url(&self.host, self.bucket.bucket()), key)
    }
}

#[async_trait]
impl StorageMode for MinioStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Minio
    }

    async fn upload_stream(
        &self,
        path_prefix: &str,
        object_name: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: ByteReader,
    ) -> StorageResult<String> {
        let key = object_key(path_prefix, object_name)?;
        self.bucket
            .put_stream(&key, content_type, content_length, reader)
            .await?;
        Ok(self.generate_url(&key))
    }

    async fn download_stream(&self, object_name: &str) -> StorageResult<ByteStream> {
        validate_key(object_name)?;
        self.bucket.get_stream(object_name).await
    }

    async fn delete(&self, object_name: &str) -> StorageResult<bool> {
        validate_key(object_name)?;
        self.bucket.delete(object_name).await
    }

    async fn exists(&self, object_name: &str) -> StorageResult<bool> {
        validate_key(object_name)?;
        self.bucket.exists(object_name).await
    }

    async fn object_url(&self, object_name: &str) -> StorageResult<String> {
        self.presigned_url(object_name, self.default_expiry).await
    }

    async fn presigned_url(
        &self,
        object_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(object_name)?;
        self.bucket.presigned_get(object_name, expires_in).await
    }

    async fn public_url(&self, object_name: &str) -> StorageResult<String> {
        validate_key(object_name)?;
        if !self.bucket.exists(object_name).await? {
            return Err(StorageError::NotFound(object_name.to_string()));
        }
        Ok(self.generate_url(object_name))
    }

    async fn list_objects(
        &self,
        prefix: &str,
        max_keys: Option<usize>,
        include_subdirs: bool,
    ) -> StorageResult<Vec<ObjectEntry>> {
        let prefix = listing_prefix(prefix)?;
        let max_keys = max_keys.unwrap_or_else(|| self.kind().default_max_keys());
        let objects = self.bucket.list(prefix, max_keys, include_subdirs).await?;

        Ok(objects
            .into_iter()
            .map(|meta| {
                let name = meta.location.to_string();
                let url = self.generate_url(&name);
                object_entry(name, url, meta.size, meta.last_modified)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile() -> StorageProfile {
        StorageProfile {
            id: 1,
            storage: "minio".to_string(),
            storage_name: "MinIO".to_string(),
            host: Some("http://files.example.com/".to_string()),
            endpoint: Some("http://127.0.0.1:9000".to_string()),
            access_key: Some("minioadmin".to_string()),
            secret_key: Some("minioadmin".to_string()),
            bucket_name: Some("test-bucket".to_string()),
            region: None,
            icon: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_url_includes_bucket() {
        let storage = MinioStorage::from_profile(&profile(), Duration::from_secs(60)).unwrap();
        let key = object_key("image", "2024-05-01_photo.jpg").unwrap();
        assert_eq!(
            storage.generate_url(&key),
            "http://files.example.com/test-bucket/image/2024-05-01_photo.jpg"
        );
        let thumb = object_key("thumb", "thumb_2024-05-01_photo.jpg").unwrap();
        assert!(storage
            .generate_url(&thumb)
            .ends_with("/test-bucket/thumb/thumb_2024-05-01_photo.jpg"));
    }

    #[test]
    fn test_host_falls_back_to_endpoint() {
        let mut profile = profile();
        profile.host = Some(" ".to_string());
        let storage = MinioStorage::from_profile(&profile, Duration::from_secs(60)).unwrap();
        assert_eq!(
            storage.generate_url("a.txt"),
            "http://127.0.0.1:9000/test-bucket/a.txt"
        );
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let mut profile = profile();
        profile.secret_key = None;
        let err = MinioStorage::from_profile(&profile, Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, StorageError::ConfigError(_)));
        assert!(err.to_string().contains("secretKey"));
    }

    #[tokio::test]
    async fn test_blank_listing_prefix_is_rejected() {
        let storage = MinioStorage::from_profile(&profile(), Duration::from_secs(60)).unwrap();
        for prefix in ["", " ", "/"] {
            assert!(matches!(
                storage.list_objects(prefix, None, true).await,
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_presigned_url_is_signed_for_bucket_key() {
        let storage = MinioStorage::from_profile(&profile(), Duration::from_secs(3600)).unwrap();
        let url = storage.object_url("image/a.png").await.unwrap();
        assert!(url.starts_with("http://127.0.0.1:9000/test-bucket/image/a.png?"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=3600"));
    }
}
