//! WASM bindings for the filter catalog.

use crate::types::{js_error, JsDecodedImage};
use photopost_core::filter::{self, FilterError, FilterKind};
use wasm_bindgen::prelude::*;

/// Display names of every filter, in catalog order.
#[wasm_bindgen]
pub fn filter_names() -> js_sys::Array {
    FilterKind::ALL
        .iter()
        .map(|kind| JsValue::from_str(kind.name()))
        .collect()
}

/// Apply a filter by display name (case-insensitive) to a decoded image.
#[wasm_bindgen]
pub fn apply_filter(image: &JsDecodedImage, name: &str) -> Result<JsDecodedImage, JsValue> {
    filter_image(image, name).map_err(js_error)
}

/// Decode, filter and re-encode image bytes as JPEG.
#[wasm_bindgen]
pub fn render_filter(bytes: &[u8], name: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    let kind: FilterKind = name.parse().map_err(js_error)?;
    filter::render_filter(bytes, kind, quality).map_err(js_error)
}

fn filter_image(image: &JsDecodedImage, name: &str) -> Result<JsDecodedImage, FilterError> {
    let kind: FilterKind = name.parse()?;
    let filtered = filter::apply_filter(&image.to_decoded(), kind);
    Ok(JsDecodedImage::from_decoded(filtered))
}
