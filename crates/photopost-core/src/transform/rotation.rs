//! Rotation onto an expanded surface with bilinear interpolation.
//!
//! The rotated surface is the axis-aligned bounding box of the rotated source,
//! so nothing is clipped. Coordinates follow raster convention (y grows
//! downward), which makes a positive angle a clockwise turn on screen.
//!
//! # Algorithm
//!
//! The rotation uses inverse mapping: for each pixel centre in the output,
//! we calculate where it lands in the source and interpolate there.
//!
//! Forward transform (draw): translate to surface centre, rotate by θ,
//! translate by `(-W/2, -H/2)`. Its inverse, per output pixel centre:
//! ```text
//! src_x =  (dst_x - cx) * cos(θ) + (dst_y - cy) * sin(θ) + W/2
//! src_y = -(dst_x - cx) * sin(θ) + (dst_y - cy) * cos(θ) + H/2
//! ```
//! Output pixels that map outside the source stay black.

use crate::decode::DecodedImage;

/// Source coordinates this close outside the image still count as covered.
const COVERAGE_EPSILON: f64 = 1e-6;

/// Compute the exact bounding box of a `width x height` rectangle rotated by
/// `angle_degrees`.
///
/// `rotW = |W·cos θ| + |H·sin θ|`, `rotH = |W·sin θ| + |H·cos θ|`.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (f64, f64) {
    let angle_rad = angle_degrees.to_radians();
    let (sin, cos) = angle_rad.sin_cos();

    let w = width as f64;
    let h = height as f64;

    let rot_w = (w * cos).abs() + (h * sin).abs();
    let rot_h = (w * sin).abs() + (h * cos).abs();
    (rot_w, rot_h)
}

/// Whole-pixel size of the surface allocated for a rotated image.
///
/// Truncates the exact bounds, as a canvas does when given a fractional
/// size. At right angles the bounds land on or just above the integer
/// (`sin 90°` is exactly 1), so truncation keeps them exact. Never zero.
pub fn rotated_surface_size(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let (rot_w, rot_h) = compute_rotated_bounds(width, height, angle_degrees);
    (
        (rot_w.floor() as u32).max(1),
        (rot_h.floor() as u32).max(1),
    )
}

/// Draw `image` rotated by `angle_degrees` around its centre onto a surface
/// sized to the rotated bounding box.
pub fn apply_rotation(image: &DecodedImage, angle_degrees: f64) -> DecodedImage {
    // Fast path: whole turns leave the raster untouched
    if angle_degrees % 360.0 == 0.0 {
        return image.clone();
    }

    let (dst_w, dst_h) = rotated_surface_size(image.width, image.height, angle_degrees);
    if image.is_empty() {
        return DecodedImage::blank(dst_w, dst_h);
    }

    let (sin, cos) = angle_degrees.to_radians().sin_cos();

    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = DecodedImage::blank(dst_w, dst_h);

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Pixel centre relative to surface centre
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            let src_x = dx * cos + dy * sin + src_cx;
            let src_y = -dx * sin + dy * cos + src_cy;

            if let Some(pixel) = sample_bilinear(image, src_x, src_y) {
                let idx = ((dst_y as usize) * (dst_w as usize) + dst_x as usize) * 3;
                output.pixels[idx..idx + 3].copy_from_slice(&pixel);
            }
        }
    }

    output
}

/// Get a pixel as [f64; 3] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &DecodedImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

/// Sample the source at a continuous position (pixel centres at `i + 0.5`).
///
/// Returns `None` when the position is outside the source image.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Option<[u8; 3]> {
    let (w, h) = (image.width as f64, image.height as f64);
    if x < -COVERAGE_EPSILON
        || y < -COVERAGE_EPSILON
        || x > w + COVERAGE_EPSILON
        || y > h + COVERAGE_EPSILON
    {
        return None;
    }

    let u = (x - 0.5).clamp(0.0, w - 1.0);
    let v = (y - 0.5).clamp(0.0, h - 1.0);

    let x0 = u.floor() as usize;
    let y0 = v.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    let fx = u - x0 as f64;
    let fy = v - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::gradient_image;

    fn pixel(image: &DecodedImage, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y * image.width + x) * 3) as usize;
        [image.pixels[idx], image.pixels[idx + 1], image.pixels[idx + 2]]
    }

    #[test]
    fn test_zero_rotation_bounds_are_identity() {
        let (w, h) = compute_rotated_bounds(100, 50, 0.0);
        assert_eq!(w, 100.0);
        assert_eq!(h, 50.0);
    }

    #[test]
    fn test_90_degree_rotation_bounds_swap() {
        let (w, h) = compute_rotated_bounds(100, 50, 90.0);
        assert!((w - 50.0).abs() < 1e-9, "width was {}", w);
        assert!((h - 100.0).abs() < 1e-9, "height was {}", h);
    }

    #[test]
    fn test_45_degree_rotation_bounds() {
        let (w, h) = compute_rotated_bounds(100, 100, 45.0);
        // Diagonal of 100x100 square is ~141.42
        assert!((w - 141.421).abs() < 0.01, "width was {}", w);
        assert!((h - 141.421).abs() < 0.01, "height was {}", h);
    }

    #[test]
    fn test_opposite_rotations_same_bounds() {
        let (w1, h1) = compute_rotated_bounds(100, 80, 30.0);
        let (w2, h2) = compute_rotated_bounds(100, 80, -30.0);

        assert!((w1 - w2).abs() < 1e-9);
        assert!((h1 - h2).abs() < 1e-9);
    }

    #[test]
    fn test_large_rotation_angles() {
        // 720 degrees = 2 full rotations
        assert_eq!(rotated_surface_size(100, 50, 720.0), (100, 50));
        // 450 degrees = 360 + 90
        assert_eq!(rotated_surface_size(100, 50, 450.0), (50, 100));
        assert_eq!(rotated_surface_size(100, 50, -270.0), (50, 100));
    }

    #[test]
    fn test_surface_never_zero() {
        for angle in [0.0, 1.0, 45.0, 89.0, 90.0, 179.0, 270.0, 359.0] {
            let (w, h) = rotated_surface_size(1, 1, angle);
            assert!(w > 0 && h > 0, "zero surface at {}", angle);
        }
    }

    #[test]
    fn test_no_rotation_is_identity() {
        let img = gradient_image(12, 7);
        assert_eq!(apply_rotation(&img, 0.0), img);
        assert_eq!(apply_rotation(&img, 360.0), img);
    }

    #[test]
    fn test_90_degree_rotation_is_clockwise() {
        let img = gradient_image(6, 4);
        let result = apply_rotation(&img, 90.0);

        assert_eq!((result.width, result.height), (4, 6));
        // Clockwise: output(x, y) = source(y, H - 1 - x)
        for y in 0..result.height {
            for x in 0..result.width {
                assert_eq!(pixel(&result, x, y), pixel(&img, y, img.height - 1 - x));
            }
        }
    }

    #[test]
    fn test_180_degree_rotation_reverses() {
        let img = gradient_image(5, 3);
        let result = apply_rotation(&img, 180.0);

        assert_eq!((result.width, result.height), (5, 3));
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(pixel(&result, x, y), pixel(&img, 4 - x, 2 - y));
            }
        }
    }

    #[test]
    fn test_rotation_expands_canvas_with_black_corners() {
        let img = DecodedImage::new(20, 20, vec![200u8; 20 * 20 * 3]);
        let result = apply_rotation(&img, 45.0);

        assert!(result.width > img.width);
        assert!(result.height > img.height);
        // Corners of the bounding box are not covered by the rotated square
        assert_eq!(pixel(&result, 0, 0), [0, 0, 0]);
        // The centre is
        assert_eq!(pixel(&result, result.width / 2, result.height / 2), [200, 200, 200]);
    }

    #[test]
    fn test_1x1_image_rotation() {
        let img = DecodedImage::new(1, 1, vec![128, 128, 128]);
        let result = apply_rotation(&img, 45.0);
        assert!(result.width >= 1);
        assert!(result.height >= 1);
    }

    #[test]
    fn test_surface_truncates_fractional_bounds() {
        // 100x100 at 45 degrees is 141.42 on each side
        assert_eq!(rotated_surface_size(100, 100, 45.0), (141, 141));
        // 100x80 at 30 degrees: 126.60 x 119.28
        assert_eq!(rotated_surface_size(100, 80, 30.0), (126, 119));
        assert_eq!(rotated_surface_size(100, 50, 90.0), (50, 100));
        assert_eq!(rotated_surface_size(100, 50, 180.0), (100, 50));
        assert_eq!(rotated_surface_size(100, 50, 270.0), (50, 100));
    }

    #[test]
    fn test_empty_image_rotation_is_blank() {
        let img = DecodedImage::new(0, 0, Vec::new());
        let result = apply_rotation(&img, 30.0);

        assert_eq!((result.width, result.height), (1, 1));
        assert_eq!(result.pixels, vec![0, 0, 0]);
    }

    #[test]
    fn test_very_thin_image_rotation() {
        let img = gradient_image(100, 1);
        let result = apply_rotation(&img, 30.0);
        assert!(result.width > 0);
        assert!(result.height > 0);
    }
}
