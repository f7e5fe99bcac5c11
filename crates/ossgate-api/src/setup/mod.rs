//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use ossgate_core::{Config, SettingsStore};
use ossgate_db::PgSettingsStore;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_tracing(config.log_format())?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let settings: Arc<dyn SettingsStore> = Arc::new(PgSettingsStore::new(pool));

    let state = services::initialize_services(&config, settings);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
