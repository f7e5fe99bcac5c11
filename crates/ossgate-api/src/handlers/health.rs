//! Health check handler

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    /// `healthy` when the settings table could be read
    pub database: String,
    /// Active backend code, or the reason it could not be resolved
    pub storage: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service healthy", body = HealthCheckResponse),
        (status = 503, description = "Settings unavailable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (database, storage) = match tokio::time::timeout(TIMEOUT, state.selector.active_kind()).await
    {
        Ok(Ok(kind)) => ("healthy".to_string(), kind.code().to_string()),
        Ok(Err(ossgate_core::AppError::Configuration(msg))) => {
            ("healthy".to_string(), format!("misconfigured: {}", msg))
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Health check failed");
            (format!("unhealthy: {}", e), "unknown".to_string())
        }
        Err(_) => {
            tracing::error!("Health check timed out");
            ("timeout".to_string(), "unknown".to_string())
        }
    };

    let healthy = database == "healthy";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            database,
            storage,
        }),
    )
}
