//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use ossgate_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ossgate API",
        version = "0.1.0",
        description = "File storage gateway (v0). Files are stored on the local disk, MinIO or Aliyun OSS; the active backend is chosen by the `storage` setting and can be switched at runtime. All file and storage endpoints are versioned under /api/v0/."
    ),
    paths(
        // Files
        handlers::files::upload_file,
        handlers::files::delete_file,
        handlers::files::download_file,
        handlers::files::download_image,
        handlers::files::list_files,
        handlers::files::list_all_files,
        // Storage administration
        handlers::storage::get_storage_setting,
        handlers::storage::get_storage_info,
        handlers::storage::list_storage_profiles,
        handlers::storage::update_storage_setting,
        // Settings
        handlers::settings::get_setting,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::ObjectEntry,
            models::UploadResult,
            models::StorageProfile,
            models::UpdateStorageSettingRequest,
            models::SysSetting,
            ossgate_core::StorageKind,
            handlers::files::DeleteResponse,
            handlers::files::DownloadResponse,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "files", description = "Upload, download, list and delete files"),
        (name = "storage", description = "Storage backend selection and profiles"),
        (name = "settings", description = "System settings"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_file_routes() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/api/v0/files/upload"));
        assert!(spec.paths.paths.contains_key("/api/v0/storage/setting"));
        assert!(spec.paths.paths.contains_key("/health"));
    }
}
