use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use ossgate_core::models::SysSetting;
use ossgate_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/settings/{code}",
    tag = "settings",
    params(
        ("code" = String, Path, description = "Setting code, e.g. `storage`")
    ),
    responses(
        (status = 200, description = "Setting row", body = SysSetting),
        (status = 404, description = "Setting not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_setting"))]
pub async fn get_setting(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<SysSetting>, HttpAppError> {
    let setting = state
        .settings
        .setting(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("setting '{}' not found", code)))?;
    Ok(Json(setting))
}
