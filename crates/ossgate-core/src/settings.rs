//! Settings seam between the storage layer and persistence.
//!
//! The backend selector only needs to read the active code and a profile; the
//! admin endpoints also list profiles and switch the active backend. The
//! Postgres implementation lives in `ossgate-db`.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{StorageProfile, SysSetting, UpdateStorageSettingRequest};

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Value of the enabled `storage` setting row, if any.
    async fn active_storage_code(&self) -> Result<Option<String>, AppError>;

    /// Profile stored for a canonical backend code.
    async fn storage_profile(&self, code: &str) -> Result<Option<StorageProfile>, AppError>;

    async fn list_storage_profiles(&self) -> Result<Vec<StorageProfile>, AppError>;

    /// Makes `request.storage` the active backend.
    ///
    /// Remote backends also get their profile saved, in the same transaction as
    /// the setting; a missing `secret_key` keeps the stored one. Returns the saved
    /// profile, `None` for local storage.
    async fn activate_storage(
        &self,
        request: &UpdateStorageSettingRequest,
    ) -> Result<Option<StorageProfile>, AppError>;

    async fn setting(&self, code: &str) -> Result<Option<SysSetting>, AppError>;
}
