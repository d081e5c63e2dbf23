//! Image encoding WASM bindings.
//!
//! ```typescript
//! import { encode_jpeg, encode_jpeg_from_image } from '@photopost/wasm';
//!
//! const jpegBytes = encode_jpeg(pixels, width, height, 95);
//! const fromImage = encode_jpeg_from_image(image, 95);
//! ```

use crate::types::{js_error, JsDecodedImage};
use photopost_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGB pixel data (3 bytes per pixel, row-major) to JPEG bytes.
///
/// # Errors
///
/// Fails if the pixel data length doesn't match `width * height * 3` or a
/// dimension is zero.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(js_error)
}

/// Encode a `JsDecodedImage` to JPEG bytes.
#[wasm_bindgen]
pub fn encode_jpeg_from_image(image: &JsDecodedImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_image(&image.to_decoded(), quality).map_err(js_error)
}

/// Map a `0.0..=1.0` quality fraction (canvas `toBlob` style) to 1-100.
#[wasm_bindgen]
pub fn jpeg_quality(fraction: f64) -> u8 {
    encode::quality_from_fraction(fraction)
}
