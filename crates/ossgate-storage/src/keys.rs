//! Shared key and URL building for storage backends.
//!
//! Key format: `{path_prefix}/{object_name}`, or `{object_name}` when the prefix is empty.

use crate::traits::{StorageError, StorageResult};

/// Build the object key for an upload into `path_prefix`.
pub fn object_key(path_prefix: &str, object_name: &str) -> StorageResult<String> {
    let name = object_name.trim();
    if name.is_empty() {
        return Err(StorageError::InvalidKey(
            "Object name must not be blank".to_string(),
        ));
    }

    let prefix = normalize_prefix(path_prefix);
    let key = if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    };

    validate_key(&key)?;
    Ok(key)
}

/// Strip whitespace and surrounding slashes from a prefix.
pub fn normalize_prefix(path_prefix: &str) -> &str {
    path_prefix.trim().trim_matches('/')
}

/// Normalized listing prefix. Blank prefixes are rejected on every backend.
pub fn listing_prefix(prefix: &str) -> StorageResult<&str> {
    let prefix = normalize_prefix(prefix);
    if prefix.is_empty() {
        return Err(StorageError::InvalidKey(
            "Listing prefix must not be blank".to_string(),
        ));
    }
    validate_key(prefix)?;
    Ok(prefix)
}

/// Reject blank keys and keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey(
            "Object name must not be blank".to_string(),
        ));
    }
    if key.starts_with('/') || key.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Join a base URL and a key with exactly one slash between them.
pub fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
