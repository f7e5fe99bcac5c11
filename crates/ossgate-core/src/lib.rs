//! ossgate core library
//!
//! This crate provides the domain models, error types, configuration and the
//! settings seam shared by all ossgate components.

pub mod config;
pub mod error;
pub mod models;
pub mod settings;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, GatewayConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use settings::SettingsStore;
pub use storage_types::StorageKind;
