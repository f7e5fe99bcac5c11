use super::{decode, encode};
use crate::error::{ProcessingError, ProcessingResult};
use ::image::ImageFormat;
use bytes::Bytes;

/// Image bytes with the content type they were encoded as
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Bytes,
    pub content_type: &'static str,
}

/// Re-encodes stored images into the format their file extension names.
pub struct ImageTranscoder;

impl ImageTranscoder {
    /// Writable format for an extension such as `png` or `JPG`.
    pub fn format_for_extension(extension: &str) -> ProcessingResult<ImageFormat> {
        ImageFormat::from_extension(extension.trim_start_matches('.'))
            .filter(|f| f.writing_enabled())
            .ok_or_else(|| ProcessingError::UnsupportedFormat(extension.to_string()))
    }

    /// Decode `data` and encode it again as `extension`. Dimensions are unchanged.
    pub fn reencode(data: &[u8], extension: &str) -> ProcessingResult<EncodedImage> {
        let format = Self::format_for_extension(extension)?;
        let (img, _) = decode(data)?;
        let data = encode(&img, format)?;

        Ok(EncodedImage {
            data,
            content_type: format.to_mime_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::test_support::create_test_image;

    #[test]
    fn test_reencode_png_as_jpeg_keeps_dimensions() {
        let data = create_test_image(120, 80, ImageFormat::Png);
        let encoded = ImageTranscoder::reencode(&data, "jpg").unwrap();

        assert_eq!(encoded.content_type, "image/jpeg");
        let decoded = ::image::load_from_memory(&encoded.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
        assert_eq!(
            ::image::guess_format(&encoded.data).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_reencode_same_format() {
        let data = create_test_image(64, 64, ImageFormat::Png);
        let encoded = ImageTranscoder::reencode(&data, "PNG").unwrap();
        assert_eq!(encoded.content_type, "image/png");
    }

    #[test]
    fn test_unsupported_extension() {
        let data = create_test_image(8, 8, ImageFormat::Png);
        let err = ImageTranscoder::reencode(&data, "docx").unwrap_err();
        assert!(matches!(err, ProcessingError::UnsupportedFormat(_)));
    }
}
