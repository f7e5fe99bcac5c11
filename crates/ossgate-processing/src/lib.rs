//! ossgate Processing Library
//!
//! Image work done around uploads and downloads: thumbnail generation and
//! re-encoding an image into the format named by its file extension. All
//! functions are synchronous and CPU bound; callers run them on a blocking
//! thread.

pub mod error;
#[cfg(feature = "image")]
pub mod image;

pub use error::{ProcessingError, ProcessingResult};
#[cfg(feature = "image")]
pub use crate::image::{EncodedImage, ImageThumbnailer, ImageTranscoder, Thumbnail};
