//! ossgate Storage Library
//!
//! This crate provides the [`StorageMode`] trait and its three implementations:
//! the local filesystem, MinIO and Aliyun OSS (both over the S3 protocol via
//! `object_store`). [`BackendSelector`] picks the implementation named by the
//! `storage` setting on every call.
//!
//! # Object keys
//!
//! An upload into `path_prefix` with `object_name` is stored under
//! `{path_prefix}/{object_name}`, or just `{object_name}` for an empty prefix.
//! Keys must not contain `..` or a leading `/`. Key handling is centralized in
//! the `keys` module so all backends stay consistent.

pub mod keys;
pub mod listing;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod minio;
#[cfg(feature = "storage-s3")]
pub mod oss;
#[cfg(feature = "storage-s3")]
pub(crate) mod s3;
pub mod selector;
pub mod traits;

// Re-export commonly used types
pub use listing::{format_last_modified, human_readable_size};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use minio::MinioStorage;
pub use ossgate_core::StorageKind;
#[cfg(feature = "storage-s3")]
pub use oss::OssStorage;
pub use selector::{BackendSelector, LocalStorageSettings};
pub use traits::{ByteReader, ByteStream, StorageError, StorageMode, StorageResult};
