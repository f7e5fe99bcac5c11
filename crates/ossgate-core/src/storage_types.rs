use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

/// Storage backend types
///
/// The `storage` setting row persists one of these codes. Parsing through
/// [`FromStr`] is the only way a stored code turns into a backend, so an
/// unknown value is rejected here instead of reaching a backend constructor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Minio,
    Oss,
}

impl StorageKind {
    pub const ALL: [StorageKind; 3] = [StorageKind::Local, StorageKind::Minio, StorageKind::Oss];

    /// Canonical code stored in the settings and profile tables.
    pub fn code(&self) -> &'static str {
        match self {
            StorageKind::Local => "local",
            StorageKind::Minio => "minio",
            StorageKind::Oss => "oss",
        }
    }

    /// Listing size used when the caller does not pass `max_keys`.
    pub fn default_max_keys(&self) -> usize {
        match self {
            StorageKind::Local => 1000,
            StorageKind::Minio => 1000,
            StorageKind::Oss => 100,
        }
    }

    /// Whether the backend needs a connection profile (endpoint, credentials, bucket).
    pub fn requires_profile(&self) -> bool {
        !matches!(self, StorageKind::Local)
    }

    /// Resolve the value of the `storage` setting. A missing or blank value selects local storage.
    pub fn from_setting(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") => Ok(StorageKind::Local),
            Some(code) => code.parse(),
        }
    }
}

impl FromStr for StorageKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StorageKind::Local),
            "minio" => Ok(StorageKind::Minio),
            "oss" | "aliyun" => Ok(StorageKind::Oss),
            _ => Err(AppError::Configuration(format!(
                "unsupported storage provider: {}",
                s
            ))),
        }
    }
}

impl Display for StorageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.code())
    }
}
