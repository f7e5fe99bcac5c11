use crate::keys::{join_url, listing_prefix, object_key, validate_key};
use crate::listing::object_entry;
use crate::traits::{ByteReader, ByteStream, StorageError, StorageMode, StorageResult};
use crate::StorageKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use ossgate_core::models::ObjectEntry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

/// Suffix of in-flight upload files; they are renamed over the target once complete.
const STAGING_SUFFIX: &str = ".part";

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Hidden sibling of `path` that receives the upload body.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(
        ".{}.{}-{}{}",
        name,
        std::process::id(),
        seq,
        STAGING_SUFFIX
    ))
}

fn is_staging_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(STAGING_SUFFIX)
}

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored objects (e.g., "/data")
    /// * `base_url` - Host prefix for object URLs (e.g., "http://h:8080")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert an object key to a filesystem path with security validation
    ///
    /// Rejects keys with traversal segments and keys that resolve outside the
    /// base directory through symlinks. Paths that do not exist yet are checked
    /// through their nearest existing ancestor.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        let resolved = path
            .ancestors()
            .find_map(|ancestor| ancestor.canonicalize().ok())
            .unwrap_or_else(|| base_canonical.clone());

        if !resolved.starts_with(&base_canonical) {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn generate_url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Walk `dir` and collect (key, size, modified) for regular files.
    async fn collect_files(
        &self,
        dir: PathBuf,
        key_prefix: String,
        include_subdirs: bool,
    ) -> StorageResult<Vec<(String, u64, DateTime<Utc>)>> {
        let mut files = Vec::new();
        let mut pending = vec![(dir, key_prefix)];

        while let Some((dir, key_prefix)) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(|e| {
                StorageError::ListFailed(format!("Failed to read {}: {}", dir.display(), e))
            })?;

            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if is_staging_name(&name) {
                    continue;
                }
                let key = format!("{}/{}", key_prefix, name);
                let file_type = entry.file_type().await?;

                if file_type.is_dir() {
                    if include_subdirs {
                        pending.push((entry.path(), key));
                    }
                } else if file_type.is_file() {
                    let metadata = entry.metadata().await?;
                    let modified = metadata
                        .modified()
                        .map(DateTime::<Utc>::from)
                        .unwrap_or_else(|_| Utc::now());
                    files.push((key, metadata.len(), modified));
                }
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl StorageMode for LocalStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    async fn upload_stream(
        &self,
        path_prefix: &str,
        object_name: &str,
        _content_type: &str,
        _content_length: Option<u64>,
        mut reader: ByteReader,
    ) -> StorageResult<String> {
        let key = object_key(path_prefix, object_name)?;
        let path = self.key_to_path(&key)?;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // The body goes to a staging file so a failed upload never touches an existing object.
        let staging = staging_path(&path);
        let mut file = fs::File::create(&staging).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                staging.display(),
                e
            ))
        })?;

        let result = async {
            let written = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
            })?;
            if written == 0 {
                return Err(StorageError::EmptyPayload(key.clone()));
            }
            file.flush().await?;
            file.sync_all().await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
            })?;
            Ok::<u64, StorageError>(written)
        }
        .await;
        drop(file);

        let written = match result {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to move upload into {}: {}",
                path.display(),
                e
            )));
        }

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn download_stream(&self, object_name: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(object_name)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(object_name.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if !file.metadata().await?.is_file() {
            return Err(StorageError::NotFound(object_name.to_string()));
        }

        tracing::debug!(path = %path.display(), key = %object_name, "Local storage stream opened");

        let stream = ReaderStream::new(file).map(|chunk| chunk.map_err(StorageError::from));
        Ok(Box::pin(stream))
    }

    async fn delete(&self, object_name: &str) -> StorageResult<bool> {
        let path = self.key_to_path(object_name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), key = %object_name, "Local storage delete successful");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %object_name, "Local storage delete: object absent");
                Ok(false)
            }
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "Local storage delete failed");
                Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }

    async fn exists(&self, object_name: &str) -> StorageResult<bool> {
        let path = self.key_to_path(object_name)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn object_url(&self, object_name: &str) -> StorageResult<String> {
        self.public_url(object_name).await
    }

    async fn presigned_url(
        &self,
        object_name: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        self.public_url(object_name).await
    }

    async fn public_url(&self, object_name: &str) -> StorageResult<String> {
        validate_key(object_name)?;
        Ok(self.generate_url(object_name))
    }

    async fn list_objects(
        &self,
        prefix: &str,
        max_keys: Option<usize>,
        include_subdirs: bool,
    ) -> StorageResult<Vec<ObjectEntry>> {
        let prefix = listing_prefix(prefix)?;

        let dir = self.key_to_path(prefix)?;
        match fs::metadata(&dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(StorageError::NotFound(prefix.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(prefix.to_string()));
            }
            Err(e) => return Err(StorageError::IoError(e)),
        }

        let mut files = self
            .collect_files(dir, prefix.to_string(), include_subdirs)
            .await?;
        files.sort_by(|a, b| a.0.cmp(&b.0));
        files.truncate(max_keys.unwrap_or_else(|| self.kind().default_max_keys()));

        let entries = files
            .into_iter()
            .map(|(key, size, modified)| {
                let url = self.generate_url(&key);
                object_entry(key, url, size, modified)
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            prefix = %prefix,
            include_subdirs,
            count = entries.len(),
            "Local storage listing"
        );

        Ok(entries)
    }
}
