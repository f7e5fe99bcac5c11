use async_trait::async_trait;
use ossgate_core::{
    models::{
        StorageProfile, SysSetting, UpdateStorageSettingRequest, SETTING_STATUS_ENABLED,
        STORAGE_SETTING_CODE,
    },
    AppError, SettingsStore,
};
use sqlx::PgPool;

use super::{SettingRepository, StorageProfileRepository};

/// `SettingsStore` backed by Postgres
#[derive(Clone)]
pub struct PgSettingsStore {
    pool: PgPool,
    settings: SettingRepository,
    profiles: StorageProfileRepository,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            settings: SettingRepository::new(pool.clone()),
            profiles: StorageProfileRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn active_storage_code(&self) -> Result<Option<String>, AppError> {
        self.settings
            .enabled_value(STORAGE_SETTING_CODE, SETTING_STATUS_ENABLED)
            .await
    }

    async fn storage_profile(&self, code: &str) -> Result<Option<StorageProfile>, AppError> {
        self.profiles.get_by_code(code).await
    }

    async fn list_storage_profiles(&self) -> Result<Vec<StorageProfile>, AppError> {
        self.profiles.list().await
    }

    async fn activate_storage(
        &self,
        request: &UpdateStorageSettingRequest,
    ) -> Result<Option<StorageProfile>, AppError> {
        let kind = request.validate()?;

        let mut tx = self.pool.begin().await?;

        let profile = if kind.requires_profile() {
            Some(self.profiles.upsert_tx(&mut tx, kind, request).await?)
        } else {
            None
        };

        self.settings
            .set_value_tx(
                &mut tx,
                STORAGE_SETTING_CODE,
                "Storage backend",
                kind.code(),
                SETTING_STATUS_ENABLED,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(storage = %kind, "Active storage backend changed");

        Ok(profile)
    }

    async fn setting(&self, code: &str) -> Result<Option<SysSetting>, AppError> {
        self.settings.get_by_code(code).await
    }
}
