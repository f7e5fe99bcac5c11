use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `sys_setting` code of the row that selects the active storage backend.
pub const STORAGE_SETTING_CODE: &str = "storage";

/// Status value of an enabled setting row.
pub const SETTING_STATUS_ENABLED: i16 = 0;

/// Generic key/value settings row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SysSetting {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub value: Option<String>,
    /// 0 = enabled, anything else disabled
    pub status: i16,
}

impl SysSetting {
    pub fn is_enabled(&self) -> bool {
        self.status == SETTING_STATUS_ENABLED
    }
}
