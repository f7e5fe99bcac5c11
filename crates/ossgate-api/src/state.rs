//! Application state shared by all handlers.

use crate::services::upload::UploadService;
use ossgate_core::{Config, SettingsStore};
use ossgate_storage::BackendSelector;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Settings table and backend profiles
    pub settings: Arc<dyn SettingsStore>,
    pub selector: BackendSelector,
    pub upload_service: UploadService,
}
