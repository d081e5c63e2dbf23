//! Crop bake: flatten rotation and crop into one exported raster.
//!
//! 1. Decode the working image, read `(W, H)`.
//! 2. Draw it rotated onto a surface sized to the rotated bounding box.
//! 3. Copy the crop rectangle (rotated-canvas pixel space) to a second surface.
//! 4. Export the second surface as JPEG.

use thiserror::Error;

use super::{apply_crop, apply_rotation, rotated_surface_size, surface_within_limits, CropRegion};
use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::encode::{encode_image, EncodeError, DEFAULT_JPEG_QUALITY};

/// Errors that abort a crop bake. None of them touch photo state.
#[derive(Debug, Error)]
pub enum BakeError {
    #[error("failed to decode working image: {0}")]
    Decode(#[from] DecodeError),

    /// A surface of this size cannot be allocated.
    #[error("cannot allocate a {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },

    /// Rejected before allocation.
    #[error("a {width}x{height} surface exceeds the allocation limit")]
    SurfaceTooLarge { width: u32, height: u32 },

    #[error("failed to export baked image: {0}")]
    Encode(#[from] EncodeError),

    /// The background task running the bake did not finish.
    #[error("bake task failed: {0}")]
    Task(String),
}

/// Parameters of one bake, captured when the user confirms the crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakeRequest {
    /// Rotation in degrees, any real value.
    pub rotation: f64,
    /// Crop rectangle in rotated-canvas pixel space.
    pub region: CropRegion,
    /// JPEG export quality (1-100).
    pub quality: u8,
}

impl BakeRequest {
    pub fn new(rotation: f64, region: CropRegion) -> Self {
        Self {
            rotation,
            region,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }
}

/// Encoded result of a bake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Rotate then crop a decoded raster. Output is exactly the region size.
pub fn bake_raster(
    image: &DecodedImage,
    rotation: f64,
    region: &CropRegion,
) -> Result<DecodedImage, BakeError> {
    let (rot_w, rot_h) = rotated_surface_size(image.width, image.height, rotation);
    if image.is_empty() {
        return Err(BakeError::EmptySurface {
            width: rot_w,
            height: rot_h,
        });
    }
    if region.is_empty() {
        return Err(BakeError::EmptySurface {
            width: region.width,
            height: region.height,
        });
    }
    if !region.within_limits() {
        return Err(BakeError::SurfaceTooLarge {
            width: region.width,
            height: region.height,
        });
    }
    if !surface_within_limits(rot_w, rot_h) {
        return Err(BakeError::SurfaceTooLarge {
            width: rot_w,
            height: rot_h,
        });
    }

    let rotated = apply_rotation(image, rotation);
    Ok(apply_crop(&rotated, region))
}

/// Full bake from encoded source bytes to encoded output bytes.
pub fn bake(source: &[u8], request: &BakeRequest) -> Result<BakedImage, BakeError> {
    let image = decode_image(source)?;
    let baked = bake_raster(&image, request.rotation, &request.region)?;
    let bytes = encode_image(&baked, request.quality)?;

    tracing::debug!(
        source_width = image.width,
        source_height = image.height,
        rotation = request.rotation,
        width = baked.width,
        height = baked.height,
        "baked crop"
    );

    Ok(BakedImage {
        bytes,
        width: baked.width,
        height: baked.height,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_support::gradient_image;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        /// The baked raster has the requested crop size for any angle.
        #[test]
        fn prop_bake_size_independent_of_angle(
            angle in -720.0f64..720.0,
            (x, y) in (0u32..=30, 0u32..=30),
            (w, h) in (1u32..=40, 1u32..=40),
        ) {
            let img = gradient_image(24, 16);
            let baked = bake_raster(&img, angle, &CropRegion::new(x, y, w, h)).unwrap();

            prop_assert_eq!(baked.width, w);
            prop_assert_eq!(baked.height, h);
        }
    }
}
