//! Test fixtures: encoded images and plain payloads.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Gradient image encoded as `format`.
pub fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .expect("Failed to encode test image");
    out.into_inner()
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    create_test_image(width, height, ImageFormat::Png)
}

pub fn create_text_file() -> Vec<u8> {
    b"hello from the gateway tests\n".to_vec()
}
