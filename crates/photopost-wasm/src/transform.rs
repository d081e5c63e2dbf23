//! WASM bindings for rotation, crop and the crop bake.
//!
//! Angles are in degrees, positive = clockwise. Crop rectangles are integer
//! pixels in the rotated surface, as reported by the interactive crop
//! surface.

use crate::types::{js_error, JsDecodedImage};
use photopost_core::transform::{
    self, apply_crop as core_crop, apply_rotation as core_rotate, BakeError, BakeRequest,
    CropRegion,
};
use wasm_bindgen::prelude::*;

/// Size of the surface a rotated image needs, as `[width, height]`.
///
/// ```typescript
/// const [w, h] = rotated_bounds(image.width, image.height, 30);
/// ```
#[wasm_bindgen]
pub fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> Vec<f64> {
    let (w, h) = transform::compute_rotated_bounds(width, height, angle_degrees);
    vec![w, h]
}

/// Rotate an image onto a surface sized to its rotated bounding box.
#[wasm_bindgen]
pub fn apply_rotation(image: &JsDecodedImage, angle_degrees: f64) -> JsDecodedImage {
    let result = core_rotate(&image.to_decoded(), angle_degrees);
    JsDecodedImage::from_decoded(result)
}

/// Copy a pixel rectangle out of an image. Output is exactly `width x height`.
///
/// Fails when the rectangle is larger than a surface may be.
#[wasm_bindgen]
pub fn apply_crop(
    image: &JsDecodedImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<JsDecodedImage, JsValue> {
    let region = CropRegion::new(x, y, width, height);
    if !region.within_limits() {
        return Err(js_error(BakeError::SurfaceTooLarge { width, height }));
    }
    let result = core_crop(&image.to_decoded(), &region);
    Ok(JsDecodedImage::from_decoded(result))
}

/// Rotate and crop encoded image bytes, returning JPEG bytes.
#[allow(clippy::too_many_arguments)]
#[wasm_bindgen]
pub fn bake_crop(
    bytes: &[u8],
    angle_degrees: f64,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, JsValue> {
    let request =
        BakeRequest::new(angle_degrees, CropRegion::new(x, y, width, height)).with_quality(quality);
    transform::bake(bytes, &request)
        .map(|baked| baked.bytes)
        .map_err(js_error)
}
