//! Photopost WASM - WebAssembly bindings for the post-creation pipeline
//!
//! This crate exposes the photopost-core engines and a synchronous wizard
//! handle to the browser front end.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data and packaged files
//! - `decode` - Decoding and dimension probing
//! - `transform` - Rotated bounds, rotation, crop and the crop bake
//! - `filter` - The filter catalog
//! - `encode` - JPEG export
//! - `wizard` - `JsPostWizard`, the stateful upload/crop/filters/description flow
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsPostWizard } from '@photopost/wasm';
//!
//! await init();
//! const wizard = new JsPostWizard();
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod filter;
mod transform;
mod types;
mod wizard;

pub use decode::{decode_image, exif_orientation, probe_size};
pub use encode::{encode_jpeg, encode_jpeg_from_image, jpeg_quality};
pub use filter::{apply_filter, filter_names, render_filter};
pub use transform::{apply_crop, apply_rotation, bake_crop, rotated_bounds};
pub use types::{JsDecodedImage, JsPackagedFile};
pub use wizard::JsPostWizard;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Accepted aspect-ratio preset labels, in display order.
#[wasm_bindgen]
pub fn aspect_presets() -> Vec<String> {
    photopost_core::AspectPreset::ALL
        .iter()
        .map(|preset| preset.label().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_aspect_presets() {
        assert_eq!(aspect_presets(), vec!["Original", "1:1", "4:5", "16:9"]);
    }
}
