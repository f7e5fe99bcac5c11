pub mod files;
pub mod health;
pub mod settings;
pub mod storage;
