//! Thumbnails for uploaded images

use super::{decode, encode, extension_of, SUPPORTED_EXTENSIONS};
use crate::error::ProcessingResult;
use ::image::ImageFormat;
use bytes::Bytes;

/// Encoded thumbnail
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Bytes,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Produces thumbnails that fit inside a bounding box, keeping the aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct ImageThumbnailer {
    max_width: u32,
    max_height: u32,
}

impl ImageThumbnailer {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
        }
    }

    pub fn bounds(&self) -> (u32, u32) {
        (self.max_width, self.max_height)
    }

    /// Whether an upload gets a thumbnail: an `image/*` content type and a
    /// jpg, jpeg, png, gif or webp file name.
    pub fn supports(content_type: &str, filename: &str) -> bool {
        let is_image = content_type
            .split('/')
            .next()
            .map(|primary| primary.trim().eq_ignore_ascii_case("image"))
            .unwrap_or(false);

        is_image
            && extension_of(filename)
                .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false)
    }

    /// Decode `data` and scale it down into the bounding box.
    ///
    /// The thumbnail keeps the source format when it can be written, PNG
    /// otherwise. Images already inside the box are not upscaled.
    pub fn generate(&self, data: &[u8]) -> ProcessingResult<Thumbnail> {
        let (img, source_format) = decode(data)?;

        let scaled = if img.width() > self.max_width || img.height() > self.max_height {
            img.thumbnail(self.max_width, self.max_height)
        } else {
            img
        };

        let format = source_format
            .filter(|f| f.writing_enabled())
            .unwrap_or(ImageFormat::Png);
        let data = encode(&scaled, format)?;

        tracing::debug!(
            width = scaled.width(),
            height = scaled.height(),
            format = ?format,
            size_bytes = data.len(),
            "Thumbnail generated"
        );

        Ok(Thumbnail {
            data,
            format,
            width: scaled.width(),
            height: scaled.height(),
        })
    }
}
