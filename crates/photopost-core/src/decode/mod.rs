//! Image decoding for the post creation pipeline.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG images to RGB rasters
//! - Probing natural dimensions without a full decode (ingestion fast path)
//! - EXIF orientation correction, so dimensions match what the user sees
//!
//! All operations are synchronous. Callers that must not block an event loop
//! run them on a blocking task (see `session`).

mod raster;
mod types;

pub use raster::{decode_image, get_orientation, probe_size};
pub use types::{DecodeError, DecodedImage, NaturalSize, Orientation};
