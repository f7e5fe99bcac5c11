//! Upload, download, listing and deletion on top of the active storage backend.

use bytes::Bytes;
use chrono::Local;
use ossgate_core::models::{ObjectEntry, UploadFolder, UploadResult};
use ossgate_core::AppError;
use ossgate_processing::image::extension_of;
use ossgate_processing::{EncodedImage, ImageThumbnailer, ImageTranscoder, Thumbnail};
use ossgate_storage::keys::object_key;
use ossgate_storage::BackendSelector;

use crate::constants::{THUMBNAIL_FOLDER, THUMBNAIL_PREFIX};

/// A file received from a client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as sent by the client; directory components are ignored
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Object name for an upload: `yyyy-MM-dd_<filename>` with any client path removed.
pub fn dated_object_name(filename: &str) -> Result<String, AppError> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(AppError::InvalidInput(format!(
            "invalid file name: '{}'",
            filename
        )));
    }
    Ok(format!("{}_{}", Local::now().format("%Y-%m-%d"), base))
}

#[derive(Clone)]
pub struct UploadService {
    selector: BackendSelector,
    thumbnailer: ImageThumbnailer,
}

impl UploadService {
    pub fn new(selector: BackendSelector, thumbnailer: ImageThumbnailer) -> Self {
        Self {
            selector,
            thumbnailer,
        }
    }

    pub fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    /// Upload into the folder matching the file's MIME type.
    pub async fn upload(&self, file: UploadedFile) -> Result<UploadResult, AppError> {
        self.upload_to(file, None).await
    }

    /// Upload into `folder`, or the MIME type folder when it is blank.
    ///
    /// Images also get a thumbnail at `thumb/thumb_<objectName>`. The thumbnail
    /// is rendered before anything is written; if storing it fails, the
    /// original is removed again and the error returned.
    #[tracing::instrument(
        skip(self, file),
        fields(filename = %file.filename, content_type = %file.content_type, size_bytes = file.data.len())
    )]
    pub async fn upload_to(
        &self,
        file: UploadedFile,
        folder: Option<&str>,
    ) -> Result<UploadResult, AppError> {
        if file.data.is_empty() {
            return Err(AppError::InvalidInput("file is empty".to_string()));
        }

        let folder = match folder.map(str::trim).filter(|f| !f.is_empty()) {
            Some(folder) => folder.to_string(),
            None => UploadFolder::from_content_type(&file.content_type)
                .as_str()
                .to_string(),
        };
        let object_name = dated_object_name(&file.filename)?;
        let key = object_key(&folder, &object_name)?;

        let thumbnail = if ImageThumbnailer::supports(&file.content_type, &file.filename) {
            Some(self.render_thumbnail(file.data.clone()).await?)
        } else {
            None
        };

        let backend = self.selector.resolve().await?;
        let url = backend
            .upload(&folder, &object_name, &file.content_type, file.data)
            .await?;

        let thumb_url = match thumbnail {
            Some(thumb) => {
                let thumb_name = format!("{}{}", THUMBNAIL_PREFIX, object_name);
                match backend
                    .upload(THUMBNAIL_FOLDER, &thumb_name, thumb.content_type(), thumb.data)
                    .await
                {
                    Ok(thumb_url) => Some(thumb_url),
                    Err(e) => {
                        if let Err(cleanup) = backend.delete(&key).await {
                            tracing::warn!(
                                error = %cleanup,
                                key = %key,
                                "Failed to remove original after thumbnail upload failure"
                            );
                        }
                        return Err(e.into());
                    }
                }
            }
            None => None,
        };

        tracing::info!(
            storage = %backend.kind(),
            folder = %folder,
            object_name = %object_name,
            thumbnail = thumb_url.is_some(),
            "File uploaded"
        );

        Ok(UploadResult { url, thumb_url })
    }

    async fn render_thumbnail(&self, data: Bytes) -> Result<Thumbnail, AppError> {
        let thumbnailer = self.thumbnailer;
        tokio::task::spawn_blocking(move || thumbnailer.generate(&data))
            .await
            .map_err(|e| AppError::Internal(format!("thumbnail task failed: {}", e)))?
            .map_err(Into::into)
    }

    /// Default access URL of an object.
    #[tracing::instrument(skip(self))]
    pub async fn download(&self, file_name: &str) -> Result<String, AppError> {
        let backend = self.selector.resolve().await?;
        Ok(backend.object_url(file_name).await?)
    }

    /// Object bytes re-encoded as the format its extension names.
    #[tracing::instrument(skip(self))]
    pub async fn download_image(&self, file_name: &str) -> Result<EncodedImage, AppError> {
        let extension = extension_of(file_name).ok_or_else(|| {
            AppError::InvalidInput(format!("'{}' has no file extension", file_name))
        })?;
        ImageTranscoder::format_for_extension(&extension)?;

        let backend = self.selector.resolve().await?;
        let data = backend.download(file_name).await?;

        tokio::task::spawn_blocking(move || ImageTranscoder::reencode(&data, &extension))
            .await
            .map_err(|e| AppError::Internal(format!("image task failed: {}", e)))?
            .map_err(Into::into)
    }

    /// `true` when the object existed and was removed.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, file_name: &str) -> Result<bool, AppError> {
        let backend = self.selector.resolve().await?;
        let deleted = backend.delete(file_name).await?;
        tracing::info!(storage = %backend.kind(), file_name = %file_name, deleted, "File delete");
        Ok(deleted)
    }

    /// Objects under `prefix`, recursively when `include_subdirs` is set.
    #[tracing::instrument(skip(self))]
    pub async fn list_objects(
        &self,
        prefix: &str,
        include_subdirs: bool,
    ) -> Result<Vec<ObjectEntry>, AppError> {
        let backend = self.selector.resolve().await?;
        Ok(backend.list_objects(prefix, None, include_subdirs).await?)
    }
}
