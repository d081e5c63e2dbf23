//! Image encoding for the post creation pipeline.
//!
//! Baked rasters are exported as JPEG. All operations are synchronous.

mod jpeg;

pub use jpeg::{encode_image, encode_jpeg, quality_from_fraction, EncodeError, DEFAULT_JPEG_QUALITY};
