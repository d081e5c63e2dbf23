//! Image decoding WASM bindings.
//!
//! ```typescript
//! import { decode_image, probe_size } from '@photopost/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const { width, height } = probe_size(bytes);
//! const image = decode_image(bytes);
//! ```

use crate::types::{js_error, JsDecodedImage};
use photopost_core::decode;
use wasm_bindgen::prelude::*;

/// Decode JPEG or PNG bytes with EXIF orientation applied.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Natural (orientation-corrected) size as `{ width, height }`, read from
/// the header only.
#[wasm_bindgen]
pub fn probe_size(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let size = decode::probe_size(bytes).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&size).map_err(js_error)
}

/// EXIF orientation tag value (1-8); 1 when absent.
#[wasm_bindgen]
pub fn exif_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}
