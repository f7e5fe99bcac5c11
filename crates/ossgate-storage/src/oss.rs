use crate::keys::{join_url, listing_prefix, object_key, validate_key};
use crate::listing::object_entry;
use crate::s3::{required_field, S3Bucket};
use crate::traits::{ByteReader, ByteStream, StorageError, StorageMode, StorageResult};
use crate::StorageKind;
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use ossgate_core::models::{ObjectEntry, StorageProfile};
use std::time::Duration;

/// Aliyun OSS storage through its S3-compatible API
///
/// OSS only accepts virtual-hosted requests, so the client talks to
/// `https://{bucket}.{endpoint}`. Public URLs are built from the profile host,
/// which for OSS is the bucket domain (or a CDN in front of it) and does not
/// repeat the bucket name.
#[derive(Clone, Debug)]
pub struct OssStorage {
    bucket: S3Bucket,
    host: String,
    default_expiry: Duration,
}

/// Split an endpoint into scheme and bare host.
fn split_endpoint(endpoint: &str) -> (&str, &str) {
    let endpoint = endpoint.trim();
    let (scheme, rest) = match endpoint.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("https", endpoint),
    };
    (scheme, rest.trim_end_matches('/'))
}

/// `oss-cn-hangzhou.aliyuncs.com` with bucket `b` becomes `https://b.oss-cn-hangzhou.aliyuncs.com`.
pub(crate) fn virtual_hosted_endpoint(endpoint: &str, bucket: &str) -> String {
    let (scheme, host) = split_endpoint(endpoint);
    if host.starts_with(&format!("{}.", bucket)) {
        format!("{}://{}", scheme, host)
    } else {
        format!("{}://{}.{}", scheme, bucket, host)
    }
}

/// Derive the signing region from an endpoint such as `oss-cn-hangzhou-internal.aliyuncs.com`.
pub(crate) fn region_from_endpoint(endpoint: &str, bucket: &str) -> StorageResult<String> {
    let (_, host) = split_endpoint(endpoint);
    let host = host
        .strip_prefix(&format!("{}.", bucket))
        .unwrap_or(host);
    let label = host.split('.').next().unwrap_or_default();

    if !label.starts_with("oss-") {
        return Err(StorageError::ConfigError(format!(
            "cannot derive OSS region from endpoint '{}'; set the profile region",
            endpoint
        )));
    }

    Ok(label.trim_end_matches("-internal").to_string())
}

impl OssStorage {
    /// Build a client from the `oss` profile.
    ///
    /// `endpoint`, `accessKey`, `secretKey` and `bucketName` are required. The
    /// region defaults to the first label of the endpoint host.
    pub fn from_profile(profile: &StorageProfile, default_expiry: Duration) -> StorageResult<Self> {
        let code = StorageKind::Oss.code();
        let endpoint = required_field(&profile.endpoint, "endpoint", code)?;
        let access_key = required_field(&profile.access_key, "accessKey", code)?;
        let secret_key = required_field(&profile.secret_key, "secretKey", code)?;
        let bucket_name = required_field(&profile.bucket_name, "bucketName", code)?;

        let region = match profile.region.as_deref().map(str::trim) {
            Some(region) if !region.is_empty() => region.to_string(),
            _ => region_from_endpoint(endpoint, bucket_name)?,
        };
        let bucket_endpoint = virtual_hosted_endpoint(endpoint, bucket_name);

        let store = AmazonS3Builder::new()
            .with_endpoint(bucket_endpoint.clone())
            .with_allow_http(bucket_endpoint.starts_with("http://"))
            .with_region(region)
            .with_bucket_name(bucket_name)
            .with_access_key_id(access_key)
            .with_secret_access_key(secret_key)
            .with_virtual_hosted_style_request(true)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let host = profile
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .unwrap_or(bucket_endpoint);

        Ok(Self {
            bucket: S3Bucket::new(store, bucket_name.to_string(), code),
            host,
            default_expiry,
        })
    }

    /// `{host}/{key}`
    fn generate_url(&self, key: &str) -> String {
        join_url(&self.host, key)
    }
}

#[async_trait]
impl StorageMode for OssStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Oss
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
