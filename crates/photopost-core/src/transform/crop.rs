//! Cropping in rotated-canvas pixel space.
//!
//! The crop rectangle comes from the interactive crop surface and is already
//! expressed in the pixel space of the rotated surface (zoom and pan are
//! folded in by the surface). Output is always exactly `width x height`;
//! parts of the rectangle that fall outside the source stay black.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Largest side a surface may have; the JPEG encoder rejects anything wider.
pub const MAX_SURFACE_SIDE: u32 = u16::MAX as u32;

/// Largest pixel count a surface may have (about 300 MB of RGB).
pub const MAX_SURFACE_PIXELS: u64 = 100_000_000;

/// Whether a `width x height` surface is within the allocation limits.
pub fn surface_within_limits(width: u32, height: u32) -> bool {
    width <= MAX_SURFACE_SIDE
        && height <= MAX_SURFACE_SIDE
        && (width as u64) * (height as u64) <= MAX_SURFACE_PIXELS
}

/// Crop rectangle in rotated-canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole `width x height` surface.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the output surface for this region can be allocated.
    pub fn within_limits(&self) -> bool {
        surface_within_limits(self.width, self.height)
    }
}

/// Copy `region` of `image` into a new raster at the origin.
///
/// # Example
///
/// ```
/// use photopost_core::decode::DecodedImage;
/// use photopost_core::transform::{apply_crop, CropRegion};
///
/// let image = DecodedImage::new(100, 100, vec![128u8; 100 * 100 * 3]);
/// let cropped = apply_crop(&image, &CropRegion::new(25, 25, 50, 50));
/// assert_eq!(cropped.width, 50);
/// assert_eq!(cropped.height, 50);
/// ```
pub fn apply_crop(image: &DecodedImage, region: &CropRegion) -> DecodedImage {
    // Fast path: full crop returns a clone
    if *region == CropRegion::full(image.width, image.height) {
        return image.clone();
    }

    let mut output = DecodedImage::blank(region.width, region.height);

    // Intersection of the region with the source, in source coordinates
    let x_start = region.x.min(image.width);
    let y_start = region.y.min(image.height);
    let x_end = region.x.saturating_add(region.width).min(image.width);
    let y_end = region.y.saturating_add(region.height).min(image.height);

    if x_start >= x_end || y_start >= y_end {
        return output;
    }

    let row_bytes = ((x_end - x_start) as usize) * 3;

    // Copy pixel data row by row for efficiency
    for src_y in y_start..y_end {
        let src_row_start = ((src_y as usize) * (image.width as usize) + x_start as usize) * 3;
        let dst_y = (src_y - region.y) as usize;
        let dst_row_start = (dst_y * region.width as usize + (x_start - region.x) as usize) * 3;

        output.pixels[dst_row_start..dst_row_start + row_bytes]
            .copy_from_slice(&image.pixels[src_row_start..src_row_start + row_bytes]);
    }

    output
}
