//! Geometry engine: rotation, cropping and the crop bake.
//!
//! # Transform Order
//!
//! A bake applies, in this order:
//! 1. Rotation onto a surface sized to the rotated bounding box
//! 2. Crop of that surface
//!
//! Filters run afterwards on the baked result (see `filter`).
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise (y-down raster)
//! - Crop coordinates are pixels in the rotated surface
//! - Origin is top-left corner

mod bake;
mod crop;
mod rotation;

pub use bake::{bake, bake_raster, BakeError, BakeRequest, BakedImage};
pub use crop::{
    apply_crop, surface_within_limits, CropRegion, MAX_SURFACE_PIXELS, MAX_SURFACE_SIDE,
};
pub use rotation::{apply_rotation, compute_rotated_bounds, rotated_surface_size};
