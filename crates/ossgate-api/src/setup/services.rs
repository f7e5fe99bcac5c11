//! Service wiring

use crate::services::upload::UploadService;
use crate::state::AppState;
use ossgate_core::{Config, SettingsStore};
use ossgate_processing::ImageThumbnailer;
use ossgate_storage::{BackendSelector, LocalStorageSettings};
use std::path::PathBuf;
use std::sync::Arc;

/// Build the application state around a settings store.
pub fn initialize_services(config: &Config, settings: Arc<dyn SettingsStore>) -> Arc<AppState> {
    let selector = BackendSelector::new(
        settings.clone(),
        LocalStorageSettings {
            root: PathBuf::from(config.local_storage_path()),
            base_url: config.local_storage_base_url().to_string(),
        },
        config.presigned_url_expiry(),
    );

    let (thumb_width, thumb_height) = config.thumbnail_size();
    let upload_service = UploadService::new(
        selector.clone(),
        ImageThumbnailer::new(thumb_width, thumb_height),
    );

    tracing::info!(
        local_storage_path = %config.local_storage_path(),
        "Storage selector initialized; backend is resolved per request"
    );

    Arc::new(AppState {
        config: config.clone(),
        settings,
        selector,
        upload_service,
    })
}
