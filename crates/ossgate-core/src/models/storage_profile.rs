use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::storage_types::StorageKind;

/// Per-backend connection profile, one row per backend code
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    pub id: i32,
    /// Backend code (`local`, `minio`, `oss`)
    pub storage: String,
    pub storage_name: String,
    /// Externally visible host used to build public URLs
    pub host: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for switching the active backend and saving its profile
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStorageSettingRequest {
    pub storage: String,
    #[serde(default)]
    pub storage_name: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    /// Omit to keep the stored secret
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl UpdateStorageSettingRequest {
    /// Checks the backend code and the fields remote backends cannot work without.
    pub fn validate(&self) -> Result<StorageKind, AppError> {
        let kind: StorageKind = self
            .storage
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("unknown storage code: {}", self.storage)))?;

        if kind.requires_profile() {
            let missing: Vec<&str> = [
                ("endpoint", &self.endpoint),
                ("accessKey", &self.access_key),
                ("bucketName", &self.bucket_name),
            ]
            .into_iter()
            .filter(|(_, value)| value.as_deref().map(str::trim).unwrap_or("").is_empty())
            .map(|(name, _)| name)
            .collect();

            if !missing.is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "{} storage requires: {}",
                    kind,
                    missing.join(", ")
                )));
            }
        }

        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(storage: &str) -> UpdateStorageSettingRequest {
        UpdateStorageSettingRequest {
            storage: storage.to_string(),
            storage_name: None,
            host: None,
            endpoint: None,
            access_key: None,
            secret_key: None,
            bucket_name: None,
            region: None,
            icon: None,
        }
    }

    #[test]
    fn test_local_needs_no_profile_fields() {
        assert_eq!(request("local").validate().unwrap(), StorageKind::Local);
    }

    #[test]
    fn test_remote_lists_missing_fields() {
        let mut req = request("minio");
        req.endpoint = Some("http://minio:9000".to_string());
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("accessKey"));
        assert!(err.contains("bucketName"));
        assert!(!err.contains("endpoint"));
    }

    #[test]
    fn test_unknown_code_is_invalid_input() {
        assert!(matches!(
            request("s3").validate(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_secret_key_is_not_serialized() {
        let profile = StorageProfile {
            id: 1,
            storage: "minio".to_string(),
            storage_name: "MinIO".to_string(),
            host: Some("http://minio:9000".to_string()),
            endpoint: Some("http://minio:9000".to_string()),
            access_key: Some("ak".to_string()),
            secret_key: Some("very-secret".to_string()),
            bucket_name: Some("test-bucket".to_string()),
            region: None,
            icon: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("very-secret"));
        assert!(json.contains("bucketName"));
    }
}
