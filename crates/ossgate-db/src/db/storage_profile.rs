use ossgate_core::{
    models::{StorageProfile, UpdateStorageSettingRequest},
    AppError, StorageKind,
};
use sqlx::{PgPool, Postgres, Transaction};

const PROFILE_COLUMNS: &str = "id, storage, storage_name, host, endpoint, access_key, secret_key, \
     bucket_name, region, icon, created_at, updated_at";

/// Repository for per-backend connection profiles
#[derive(Clone)]
pub struct StorageProfileRepository {
    pool: PgPool,
}

/// Trimmed value, `None` when blank.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl StorageProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_profiles", db.operation = "select"))]
    pub async fn get_by_code(&self, code: &str) -> Result<Option<StorageProfile>, AppError> {
        let profile = sqlx::query_as::<Postgres, StorageProfile>(&format!(
            "SELECT {} FROM storage_profiles WHERE storage = $1",
            PROFILE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_profiles", db.operation = "select"))]
    pub async fn list(&self) -> Result<Vec<StorageProfile>, AppError> {
        let profiles = sqlx::query_as::<Postgres, StorageProfile>(&format!(
            "SELECT {} FROM storage_profiles ORDER BY id ASC",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Insert or update the profile for `kind`. A blank secret keeps the stored one.
    #[tracing::instrument(
        skip(self, tx, request),
        fields(db.table = "storage_profiles", db.operation = "upsert", storage = %kind)
    )]
    pub async fn upsert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        kind: StorageKind,
        request: &UpdateStorageSettingRequest,
    ) -> Result<StorageProfile, AppError> {
        let storage_name = non_blank(&request.storage_name)
            .map(str::to_string)
            .unwrap_or_else(|| kind.code().to_string());

        let profile = sqlx::query_as::<Postgres, StorageProfile>(&format!(
            r#"
            INSERT INTO storage_profiles
                (storage, storage_name, host, endpoint, access_key, secret_key, bucket_name, region, icon)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (storage) DO UPDATE
            SET storage_name = EXCLUDED.storage_name,
                host = EXCLUDED.host,
                endpoint = EXCLUDED.endpoint,
                access_key = EXCLUDED.access_key,
                secret_key = COALESCE(EXCLUDED.secret_key, storage_profiles.secret_key),
                bucket_name = EXCLUDED.bucket_name,
                region = EXCLUDED.region,
                icon = EXCLUDED.icon,
                updated_at = NOW()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(kind.code())
        .bind(storage_name)
        .bind(non_blank(&request.host))
        .bind(non_blank(&request.endpoint))
        .bind(non_blank(&request.access_key))
        .bind(non_blank(&request.secret_key))
        .bind(non_blank(&request.bucket_name))
        .bind(non_blank(&request.region))
        .bind(non_blank(&request.icon))
        .fetch_one(&mut **tx)
        .await?;

        Ok(profile)
    }
}
