//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, OPENAPI_PATH};
use crate::error::hide_error_details;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use ossgate_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Multipart framing allowance on top of the file size limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = config.http_concurrency_limit();

    let body_limit = config
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let files_path = files_mount_path(config.local_storage_base_url());
    let local_files = ServeDir::new(config.local_storage_path());

    let app = Router::new()
        .merge(file_routes())
        .merge(storage_routes())
        .route("/health", get(handlers::health::health_check))
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"));

    // Local backend URLs point here
    let app = if files_path.is_empty() {
        app.fallback_service(local_files)
    } else {
        app.nest_service(&files_path, local_files)
    };

    let app = app
        .layer(axum::middleware::from_fn_with_state(
            config.is_production(),
            hide_error_details,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(
        http_concurrency_limit,
        body_limit_bytes = body_limit,
        local_files_path = %files_path,
        "Routes configured"
    );

    Ok(app)
}

/// Path component of the local storage base URL, without a trailing slash.
/// Empty when files are served from the root.
fn files_mount_path(base_url: &str) -> String {
    let without_scheme = base_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(base_url);
    let path = without_scheme
        .find('/')
        .map(|i| &without_scheme[i..])
        .unwrap_or("");
    let path = path.split(['?', '#']).next().unwrap_or("");
    path.trim_end_matches('/').to_string()
}

fn file_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/files/upload", API_PREFIX),
            post(handlers::files::upload_file),
        )
        .route(
            &format!("{}/files", API_PREFIX),
            delete(handlers::files::delete_file),
        )
        .route(
            &format!("{}/files/download", API_PREFIX),
            get(handlers::files::download_file),
        )
        .route(
            &format!("{}/files/image", API_PREFIX),
            get(handlers::files::download_image),
        )
        .route(
            &format!("{}/files/list", API_PREFIX),
            get(handlers::files::list_files),
        )
        .route(
            &format!("{}/files/list/all", API_PREFIX),
            get(handlers::files::list_all_files),
        )
}

fn storage_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/storage/setting", API_PREFIX),
            get(handlers::storage::get_storage_setting)
                .put(handlers::storage::update_storage_setting),
        )
        .route(
            &format!("{}/storage/info", API_PREFIX),
            get(handlers::storage::get_storage_info),
        )
        .route(
            &format!("{}/storage/profiles", API_PREFIX),
            get(handlers::storage::list_storage_profiles),
        )
        .route(
            &format!("{}/settings/{{code}}", API_PREFIX),
            get(handlers::settings::get_setting),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_mount_path() {
        assert_eq!(files_mount_path("http://localhost:4000/files"), "/files");
        assert_eq!(files_mount_path("http://localhost:4000/files/"), "/files");
        assert_eq!(files_mount_path("https://cdn.example.com/a/b"), "/a/b");
        assert_eq!(files_mount_path("http://localhost:4000"), "");
        assert_eq!(files_mount_path("http://localhost:4000/"), "");
    }
}
