use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Destination folder picked from the MIME type's primary segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    Image,
    Video,
    Music,
    File,
}

impl UploadFolder {
    pub fn from_content_type(content_type: &str) -> Self {
        let primary = content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "image" => UploadFolder::Image,
            "video" => UploadFolder::Video,
            "audio" => UploadFolder::Music,
            _ => UploadFolder::File,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFolder::Image => "image",
            UploadFolder::Video => "video",
            UploadFolder::Music => "music",
            UploadFolder::File => "file",
        }
    }
}

/// Response body of an upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub url: String,
    /// Only set for images
    pub thumb_url: Option<String>,
}
