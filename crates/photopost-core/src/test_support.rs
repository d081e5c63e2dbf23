//! Shared fixtures for unit tests.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::decode::DecodedImage;
use crate::encode::{encode_image, DEFAULT_JPEG_QUALITY};
use crate::ingest::SelectedFile;

/// Image where each pixel encodes its position, so crops are traceable.
pub fn gradient_image(width: u32, height: u32) -> DecodedImage {
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 3);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 7 % 256) as u8);
            pixels.push((y * 11 % 256) as u8);
            pixels.push(((x + y) * 3 % 256) as u8);
        }
    }
    DecodedImage::new(width, height, pixels)
}

/// Image filled with one color.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DecodedImage {
    let pixels = rgb
        .iter()
        .copied()
        .cycle()
        .take((width as usize) * (height as usize) * 3)
        .collect();
    DecodedImage::new(width, height, pixels)
}

pub fn png_bytes(image: &DecodedImage) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        )
        .expect("png encode");
    out
}

pub fn jpeg_bytes(image: &DecodedImage) -> Vec<u8> {
    encode_image(image, DEFAULT_JPEG_QUALITY).expect("jpeg encode")
}

pub fn png_file(name: &str, width: u32, height: u32) -> SelectedFile {
    SelectedFile::new(name, "image/png", png_bytes(&gradient_image(width, height)))
}

/// A file that passes validation but cannot be decoded.
pub fn undecodable_file(name: &str) -> SelectedFile {
    SelectedFile::new(name, "image/jpeg", b"not really a jpeg".to_vec())
}

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
