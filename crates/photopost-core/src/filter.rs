//! Filter engine: a fixed catalog of pure per-pixel color transforms.
//!
//! Filters always run on the post-crop baseline, never on a previously
//! filtered raster, so switching filters is idempotent.
//!
//! ## Catalog
//! Channels are in `[0, 255]` and computed in `f64`; results are clamped
//! then truncated.
//! - `Original`: identity
//! - `Grayscale`: `R' = G' = B' = (R + G + B) / 3`
//! - `Sepia`: fixed 3x3 matrix
//! - `Contrast`: `c' = (c - 128) * 1.25 + 128`
//! - `Brightness`: `c' = c * 1.25`
//! - `Saturation`: `c' = luma + (c - luma) * 1.5`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::encode::{encode_image, EncodeError};

pub const CONTRAST_FACTOR: f64 = 1.25;
pub const BRIGHTNESS_FACTOR: f64 = 1.25;
pub const SATURATION_FACTOR: f64 = 1.5;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error("failed to decode baseline image: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to export filtered image: {0}")]
    Encode(#[from] EncodeError),

    /// The background task running the filter did not finish.
    #[error("filter task failed: {0}")]
    Task(String),
}

/// A filter from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterKind {
    #[default]
    Original,
    Grayscale,
    Sepia,
    Contrast,
    Brightness,
    Saturation,
}

/// Pure transform of one RGB pixel.
type PixelTransform = fn([f64; 3]) -> [f64; 3];

impl FilterKind {
    /// Every filter, in display order.
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Original,
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Contrast,
        FilterKind::Brightness,
        FilterKind::Saturation,
    ];

    /// Display name, also accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Original => "Original",
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Sepia => "Sepia",
            FilterKind::Contrast => "Contrast",
            FilterKind::Brightness => "Brightness",
            FilterKind::Saturation => "Saturation",
        }
    }

    /// `Original` needs no pixel pass.
    pub fn is_identity(self) -> bool {
        self == FilterKind::Original
    }

    fn transform(self) -> PixelTransform {
        match self {
            FilterKind::Original => identity,
            FilterKind::Grayscale => grayscale,
            FilterKind::Sepia => sepia,
            FilterKind::Contrast => contrast,
            FilterKind::Brightness => brightness,
            FilterKind::Saturation => saturation,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    /// Case-insensitive match on the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FilterError::UnknownFilter(s.to_string()))
    }
}

#[inline]
fn identity(px: [f64; 3]) -> [f64; 3] {
    px
}

#[inline]
fn grayscale([r, g, b]: [f64; 3]) -> [f64; 3] {
    let avg = (r + g + b) / 3.0;
    [avg, avg, avg]
}

#[inline]
fn sepia([r, g, b]: [f64; 3]) -> [f64; 3] {
    [
        0.393 * r + 0.769 * g + 0.189 * b,
        0.349 * r + 0.686 * g + 0.168 * b,
        0.272 * r + 0.534 * g + 0.131 * b,
    ]
}

#[inline]
fn contrast(px: [f64; 3]) -> [f64; 3] {
    px.map(|c| (c - 128.0) * CONTRAST_FACTOR + 128.0)
}

#[inline]
fn brightness(px: [f64; 3]) -> [f64; 3] {
    px.map(|c| c * BRIGHTNESS_FACTOR)
}

/// Luma uses the BT.601 weights.
#[inline]
fn saturation([r, g, b]: [f64; 3]) -> [f64; 3] {
    let luma = 0.2989 * r + 0.587 * g + 0.114 * b;
    [r, g, b].map(|c| luma + (c - luma) * SATURATION_FACTOR)
}

/// Apply a filter to RGB pixel data in place.
pub fn apply_filter_in_place(pixels: &mut [u8], kind: FilterKind) {
    if kind.is_identity() {
        return;
    }

    let transform = kind.transform();
    for chunk in pixels.chunks_exact_mut(3) {
        let out = transform([chunk[0] as f64, chunk[1] as f64, chunk[2] as f64]);
        chunk[0] = out[0].clamp(0.0, 255.0) as u8;
        chunk[1] = out[1].clamp(0.0, 255.0) as u8;
        chunk[2] = out[2].clamp(0.0, 255.0) as u8;
    }
}

/// Apply a filter to a baseline raster, leaving the baseline untouched.
pub fn apply_filter(baseline: &DecodedImage, kind: FilterKind) -> DecodedImage {
    let mut output = baseline.clone();
    apply_filter_in_place(&mut output.pixels, kind);
    output
}

/// Decode the baseline, run one full pixel pass and export as JPEG.
pub fn render_filter(baseline: &[u8], kind: FilterKind, quality: u8) -> Result<Vec<u8>, FilterError> {
    let image = decode_image(baseline)?;
    let filtered = apply_filter(&image, kind);
    let bytes = encode_image(&filtered, quality)?;

    tracing::debug!(
        filter = kind.name(),
        width = image.width,
        height = image.height,
        "rendered filter"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::DEFAULT_JPEG_QUALITY;
    use crate::test_support::{gradient_image, png_bytes, solid_image};

    fn filtered(pixel: [u8; 3], kind: FilterKind) -> [u8; 3] {
        let mut px = pixel.to_vec();
        apply_filter_in_place(&mut px, kind);
        [px[0], px[1], px[2]]
    }

    #[test]
    fn test_original_is_identity() {
        let img = gradient_image(8, 8);
        assert_eq!(apply_filter(&img, FilterKind::Original), img);
    }

    #[test]
    fn test_sepia_on_white() {
        // 0.272*255 + 0.534*255 + 0.131*255 = 238.9, truncated to 238
        assert_eq!(filtered([255, 255, 255], FilterKind::Sepia), [255, 255, 238]);
    }

    #[test]
    fn test_sepia_exact_integer_is_not_truncated_down() {
        // 0.534*35 + 0.131*10 = 20.0
        assert_eq!(filtered([0, 35, 10], FilterKind::Sepia)[2], 20);
    }

    #[test]
    fn test_sepia_on_black() {
        assert_eq!(filtered([0, 0, 0], FilterKind::Sepia), [0, 0, 0]);
    }

    #[test]
    fn test_grayscale_averages() {
        assert_eq!(filtered([30, 60, 90], FilterKind::Grayscale), [60, 60, 60]);
        // (10 + 20 + 31) / 3 = 20.33
        assert_eq!(filtered([10, 20, 31], FilterKind::Grayscale), [20, 20, 20]);
    }

    #[test]
    fn test_contrast() {
        assert_eq!(filtered([128, 128, 128], FilterKind::Contrast), [128, 128, 128]);
        // (0 - 128) * 1.25 + 128 = -32 -> 0; (255 - 128) * 1.25 + 128 = 286.75 -> 255
        assert_eq!(filtered([0, 255, 200], FilterKind::Contrast), [0, 255, 218]);
    }

    #[test]
    fn test_contrast_pivot_is_fixed() {
        let gray = solid_image(6, 4, [128, 128, 128]);
        assert_eq!(apply_filter(&gray, FilterKind::Contrast), gray);
    }

    #[test]
    fn test_brightness() {
        assert_eq!(filtered([100, 204, 250], FilterKind::Brightness), [125, 255, 255]);
    }

    #[test]
    fn test_saturation_keeps_gray() {
        assert_eq!(filtered([90, 90, 90], FilterKind::Saturation), [90, 90, 90]);
    }

    #[test]
    fn test_saturation_exact_integer_is_not_truncated_down() {
        // luma = 28.0, so R' = 28 + (20 - 28) * 1.5 = 16.0
        assert_eq!(filtered([20, 28, 49], FilterKind::Saturation)[0], 16);
    }

    #[test]
    fn test_saturation_pushes_away_from_luma() {
        let [r, g, b] = filtered([200, 100, 50], FilterKind::Saturation);
        assert!(r > 200);
        assert!(b < 50);
        assert!(g < 100);
    }

    #[test]
    fn test_grayscale_twice_from_baseline_is_stable() {
        let baseline = gradient_image(16, 9);
        let first = apply_filter(&baseline, FilterKind::Grayscale);
        let second = apply_filter(&baseline, FilterKind::Grayscale);

        assert_eq!(first, second);
        assert_eq!(baseline, gradient_image(16, 9));
    }

    #[test]
    fn test_reselection_matches_direct_selection() {
        let baseline = png_bytes(&gradient_image(12, 12));

        let direct = render_filter(&baseline, FilterKind::Sepia, DEFAULT_JPEG_QUALITY).unwrap();
        let _ = render_filter(&baseline, FilterKind::Original, DEFAULT_JPEG_QUALITY).unwrap();
        let again = render_filter(&baseline, FilterKind::Sepia, DEFAULT_JPEG_QUALITY).unwrap();

        assert_eq!(direct, again);
    }

    #[test]
    fn test_render_filter_undecodable() {
        let result = render_filter(b"nope", FilterKind::Sepia, DEFAULT_JPEG_QUALITY);
        assert!(matches!(result, Err(FilterError::Decode(_))));
    }

    #[test]
    fn test_parse_names() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.name().parse::<FilterKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert_eq!(" sepia ".parse::<FilterKind>().unwrap(), FilterKind::Sepia);
    }

    #[test]
    fn test_parse_unknown_is_error() {
        let result = "Vintage".parse::<FilterKind>();
        assert!(matches!(result, Err(FilterError::UnknownFilter(name)) if name == "Vintage"));
    }
}
