//! Backend selection from the `storage` setting.

use crate::traits::StorageMode;
use crate::StorageKind;
use ossgate_core::{AppError, SettingsStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where the local backend keeps files and how it addresses them.
#[derive(Clone, Debug)]
pub struct LocalStorageSettings {
    pub root: PathBuf,
    pub base_url: String,
}

/// Resolves the active storage backend.
///
/// Nothing is cached: every call reads the setting and builds a fresh client,
/// so switching backends through the settings endpoint takes effect on the
/// next request.
#[derive(Clone)]
pub struct BackendSelector {
    settings: Arc<dyn SettingsStore>,
    local: LocalStorageSettings,
    presigned_expiry: Duration,
}

impl BackendSelector {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        local: LocalStorageSettings,
        presigned_expiry: Duration,
    ) -> Self {
        Self {
            settings,
            local,
            presigned_expiry,
        }
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn local_settings(&self) -> &LocalStorageSettings {
        &self.local
    }

    /// Backend named by the enabled `storage` setting. Missing or blank means local.
    pub async fn active_kind(&self) -> Result<StorageKind, AppError> {
        let code = self.settings.active_storage_code().await?;
        StorageKind::from_setting(code.as_deref())
    }

    /// Build the backend for the active setting.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self) -> Result<Arc<dyn StorageMode>, AppError> {
        let kind = self.active_kind().await?;
        self.build(kind).await
    }

    /// Build the backend for an explicit provider code.
    #[tracing::instrument(skip(self))]
    pub async fn select(&self, code: &str) -> Result<Arc<dyn StorageMode>, AppError> {
        let kind = StorageKind::from_setting(Some(code))?;
        self.build(kind).await
    }

    async fn build(&self, kind: StorageKind) -> Result<Arc<dyn StorageMode>, AppError> {
        tracing::debug!(storage = %kind, "Resolving storage backend");

        match kind {
            StorageKind::Local => self.build_local().await,
            StorageKind::Minio | StorageKind::Oss => self.build_remote(kind).await,
        }
    }

    #[cfg(feature = "storage-local")]
    async fn build_local(&self) -> Result<Arc<dyn StorageMode>, AppError> {
        let storage =
            crate::LocalStorage::new(self.local.root.clone(), self.local.base_url.clone()).await?;
        Ok(Arc::new(storage))
    }

    #[cfg(not(feature = "storage-local"))]
    async fn build_local(&self) -> Result<Arc<dyn StorageMode>, AppError> {
        Err(AppError::Configuration(
            "local storage support is not compiled in".to_string(),
        ))
    }

    #[cfg(feature = "storage-s3")]
    async fn build_remote(&self, kind: StorageKind) -> Result<Arc<dyn StorageMode>, AppError> {
        let profile = self
            .settings
            .storage_profile(kind.code())
            .await?
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "storage profile '{}' is not configured",
                    kind.code()
                ))
            })?;

        let storage: Arc<dyn StorageMode> = match kind {
            StorageKind::Oss => Arc::new(crate::OssStorage::from_profile(
                &profile,
                self.presigned_expiry,
            )?),
            _ => Arc::new(crate::MinioStorage::from_profile(
                &profile,
                self.presigned_expiry,
            )?),
        };
        Ok(storage)
    }

    #[cfg(not(feature = "storage-s3"))]
    async fn build_remote(&self, kind: StorageKind) -> Result<Arc<dyn StorageMode>, AppError> {
        Err(AppError::Configuration(format!(
            "{} storage support is not compiled in",
            kind
        )))
    }
}

#[cfg(all(test, feature = "storage-local", feature = "storage-s3"))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use ossgate_core::models::{StorageProfile, SysSetting, UpdateStorageSettingRequest};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeSettings {
        active: Mutex<Option<String>>,
        profiles: Mutex<Vec<StorageProfile>>,
    }

    #[async_trait]
    impl SettingsStore for FakeSettings {
        async fn active_storage_code(&self) -> Result<Option<String>, AppError> {
            Ok(self.active.lock().unwrap().clone())
        }

        async fn storage_profile(&self, code: &str) -> Result<Option<StorageProfile>, AppError> {
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.storage == code)
                .cloned())
        }

        async fn list_storage_profiles(&self) -> Result<Vec<StorageProfile>, AppError> {
            Ok(self.profiles.lock().unwrap().clone())
        }

        async fn activate_storage(
            &self,
            _request: &UpdateStorageSettingRequest,
        ) -> Result<Option<StorageProfile>, AppError> {
            Err(AppError::Internal("not used".to_string()))
        }

        async fn setting(&self, _code: &str) -> Result<Option<SysSetting>, AppError> {
            Ok(None)
        }
    }

    fn minio_profile() -> StorageProfile {
        StorageProfile {
            id: 1,
            storage: "minio".to_string(),
            storage_name: "MinIO".to_string(),
            host: None,
            endpoint: Some("http://127.0.0.1:9000".to_string()),
            access_key: Some("minioadmin".to_string()),
            secret_key: Some("minioadmin".to_string()),
            bucket_name: Some("uploads".to_string()),
            region: None,
            icon: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn selector(settings: Arc<FakeSettings>, dir: &TempDir) -> BackendSelector {
        BackendSelector::new(
            settings,
            LocalStorageSettings {
                root: dir.path().to_path_buf(),
                base_url: "http://localhost:4000".to_string(),
            },
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_missing_setting_resolves_local() {
        let dir = TempDir::new().unwrap();
        let selector = selector(Arc::new(FakeSettings::default()), &dir);
        let backend = selector.resolve().await.unwrap();
        assert_eq!(backend.kind(), StorageKind::Local);
    }

    #[tokio::test]
    async fn test_unknown_code_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let settings = Arc::new(FakeSettings::default());
        *settings.active.lock().unwrap() = Some("ftp".to_string());
        let selector = selector(settings, &dir);
        let err = selector.resolve().await.err().unwrap();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_minio_profile_resolves_minio() {
        let dir = TempDir::new().unwrap();
        let settings = Arc::new(FakeSettings::default());
        *settings.active.lock().unwrap() = Some("minio".to_string());
        settings.profiles.lock().unwrap().push(minio_profile());
        let selector = selector(settings, &dir);
        let backend = selector.resolve().await.unwrap();
        assert_eq!(backend.kind(), StorageKind::Minio);
    }

    #[tokio::test]
    async fn test_missing_profile_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let settings = Arc::new(FakeSettings::default());
        *settings.active.lock().unwrap() = Some("oss".to_string());
        let selector = selector(settings, &dir);
        let err = selector.resolve().await.err().unwrap();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn test_switch_takes_effect_next_call() {
        let dir = TempDir::new().unwrap();
        let settings = Arc::new(FakeSettings::default());
        settings.profiles.lock().unwrap().push(minio_profile());
        let selector = selector(settings.clone(), &dir);

        assert_eq!(selector.resolve().await.unwrap().kind(), StorageKind::Local);
        *settings.active.lock().unwrap() = Some("minio".to_string());
        assert_eq!(selector.resolve().await.unwrap().kind(), StorageKind::Minio);
    }
}
