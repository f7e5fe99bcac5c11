use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One object returned by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    /// Object key relative to the bucket or storage root
    pub name: String,
    pub url: String,
    /// Human-readable size such as `2.00KB`
    pub size: String,
    /// `yyyy-MM-dd`
    pub last_modified: String,
}
