//! Image processing module
//!
//! - Thumbnails for uploaded images (thumbnail)
//! - Re-encoding to the format named by a file extension (transcoder)

pub mod thumbnail;
pub mod transcoder;

pub use thumbnail::{ImageThumbnailer, Thumbnail};
pub use transcoder::{EncodedImage, ImageTranscoder};

use crate::error::{ProcessingError, ProcessingResult};
use ::image::{DynamicImage, ImageFormat, ImageReader};
use bytes::Bytes;
use std::io::Cursor;

/// Extensions accepted for thumbnails and re-encoding.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Lowercased extension of `filename`, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub(crate) fn decode(data: &[u8]) -> ProcessingResult<(DynamicImage, Option<ImageFormat>)> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProcessingError::Decode(e.to_string()))?;
    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|e| ProcessingError::Decode(e.to_string()))?;
    Ok((img, format))
}

/// Encode `img` as `format`. JPEG has no alpha channel, so it is dropped first.
pub(crate) fn encode(img: &DynamicImage, format: ImageFormat) -> ProcessingResult<Bytes> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);

    let result = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut cursor, format),
        _ => img.write_to(&mut cursor, format),
    };
    result.map_err(|e| ProcessingError::Encode(e.to_string()))?;

    Ok(Bytes::from(buffer))
}
