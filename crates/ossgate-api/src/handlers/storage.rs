use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use ossgate_core::models::{StorageProfile, UpdateStorageSettingRequest};
use ossgate_core::{AppError, StorageKind};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson, ValidatedQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StorageQuery {
    /// Backend code: `local`, `minio` or `oss`
    pub storage: String,
}

/// Profile describing the local backend, built from configuration.
fn local_profile(state: &AppState) -> StorageProfile {
    let now = Utc::now();
    StorageProfile {
        id: 0,
        storage: StorageKind::Local.code().to_string(),
        storage_name: "Local storage".to_string(),
        host: Some(state.config.local_storage_base_url().to_string()),
        endpoint: None,
        access_key: None,
        secret_key: None,
        bucket_name: None,
        region: None,
        icon: None,
        created_at: now,
        updated_at: now,
    }
}

async fn profile_for(state: &AppState, kind: StorageKind) -> Result<StorageProfile, AppError> {
    if !kind.requires_profile() {
        return Ok(local_profile(state));
    }
    state
        .settings
        .storage_profile(kind.code())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("storage profile '{}' is not configured", kind)))
}

/// Profile of the active backend
#[utoipa::path(
    get,
    path = "/api/v0/storage/setting",
    tag = "storage",
    responses(
        (status = 200, description = "Active backend profile", body = StorageProfile),
        (status = 404, description = "Active backend has no profile", body = ErrorResponse),
        (status = 500, description = "Unsupported backend code in settings", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_storage_setting"))]
pub async fn get_storage_setting(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StorageProfile>, HttpAppError> {
    let kind = state.selector.active_kind().await?;
    Ok(Json(profile_for(&state, kind).await?))
}

/// Profile of a backend by code
#[utoipa::path(
    get,
    path = "/api/v0/storage/info",
    tag = "storage",
    params(StorageQuery),
    responses(
        (status = 200, description = "Backend profile", body = StorageProfile),
        (status = 400, description = "Unknown backend code", body = ErrorResponse),
        (status = 404, description = "No profile stored", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(storage = %query.storage, operation = "get_storage_info"))]
pub async fn get_storage_info(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<StorageQuery>,
) -> Result<Json<StorageProfile>, HttpAppError> {
    let kind: StorageKind = query
        .storage
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("unknown storage code: {}", query.storage)))?;
    Ok(Json(profile_for(&state, kind).await?))
}

/// All stored backend profiles
#[utoipa::path(
    get,
    path = "/api/v0/storage/profiles",
    tag = "storage",
    responses(
        (status = 200, description = "Stored profiles", body = [StorageProfile]),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_storage_profiles"))]
pub async fn list_storage_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StorageProfile>>, HttpAppError> {
    Ok(Json(state.settings.list_storage_profiles().await?))
}

/// Switch the active backend
///
/// Remote backends need `endpoint`, `accessKey` and `bucketName`; their profile
/// is saved together with the setting. Omit `secretKey` to keep the stored one.
/// The next file request uses the new backend.
#[utoipa::path(
    put,
    path = "/api/v0/storage/setting",
    tag = "storage",
    request_body = UpdateStorageSettingRequest,
    responses(
        (status = 200, description = "Backend activated", body = StorageProfile),
        (status = 400, description = "Unknown code or missing profile fields", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(storage = %request.storage, operation = "update_storage_setting"))]
pub async fn update_storage_setting(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UpdateStorageSettingRequest>,
) -> Result<Json<StorageProfile>, HttpAppError> {
    request.validate()?;
    let profile = match state.settings.activate_storage(&request).await? {
        Some(profile) => profile,
        None => local_profile(&state),
    };
    Ok(Json(profile))
}
