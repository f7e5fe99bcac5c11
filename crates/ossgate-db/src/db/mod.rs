//! Database repositories for data access layer
//!
//! `SettingRepository` reads and writes `sys_setting` rows,
//! `StorageProfileRepository` owns `storage_profiles`, and `PgSettingsStore`
//! combines both behind the `SettingsStore` trait used by the storage layer.

pub mod setting;
pub mod settings_store;
pub mod storage_profile;

pub use setting::SettingRepository;
pub use settings_store::PgSettingsStore;
pub use storage_profile::StorageProfileRepository;
