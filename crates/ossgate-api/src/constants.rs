//! API constants

/// Versioned prefix for every file and storage route
pub const API_PREFIX: &str = "/api/v0";

/// Path of the served OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Folder that receives image thumbnails
pub const THUMBNAIL_FOLDER: &str = "thumb";

/// Prefix added to the object name of a thumbnail
pub const THUMBNAIL_PREFIX: &str = "thumb_";
