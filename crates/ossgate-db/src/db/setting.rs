use ossgate_core::{models::SysSetting, AppError};
use sqlx::{PgPool, Postgres, Transaction};

/// Repository for `sys_setting` rows
#[derive(Clone)]
pub struct SettingRepository {
    pool: PgPool,
}

impl SettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "sys_setting", db.operation = "select"))]
    pub async fn get_by_code(&self, code: &str) -> Result<Option<SysSetting>, AppError> {
        let setting = sqlx::query_as::<Postgres, SysSetting>(
            "SELECT id, code, name, description, value, status FROM sys_setting WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting)
    }

    /// Value of the setting row with `code`, only if that row is enabled.
    #[tracing::instrument(skip(self), fields(db.table = "sys_setting", db.operation = "select"))]
    pub async fn enabled_value(
        &self,
        code: &str,
        enabled_status: i16,
    ) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<Postgres, Option<String>>(
            "SELECT value FROM sys_setting WHERE code = $1 AND status = $2",
        )
        .bind(code)
        .bind(enabled_status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.flatten())
    }

    /// Insert or replace the value of a setting and enable it.
    #[tracing::instrument(skip(self, tx), fields(db.table = "sys_setting", db.operation = "upsert"))]
    pub async fn set_value_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        name: &str,
        value: &str,
        enabled_status: i16,
    ) -> Result<SysSetting, AppError> {
        let setting = sqlx::query_as::<Postgres, SysSetting>(
            r#"
            INSERT INTO sys_setting (code, name, value, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO UPDATE
            SET value = EXCLUDED.value, status = EXCLUDED.status
            RETURNING id, code, name, description, value, status
            "#,
        )
        .bind(code)
        .bind(name)
        .bind(value)
        .bind(enabled_status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(setting)
    }
}
