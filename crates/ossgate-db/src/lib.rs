//! Postgres persistence for settings and storage profiles.

pub mod db;

pub use db::{PgSettingsStore, SettingRepository, StorageProfileRepository};
