//! Stylize filters: Emboss, Vintage.
//!
//! These are artistic effect filters.
//! Emboss reads a 3x3 neighborhood; Vintage is pixel-wise apart from its
//! vignette, which is measured against the full image via the input's
//! [`Frame`].

use ndarray::{Array3, ArrayView3};

use super::core::convolve_3x3_rgb;
use super::Filter;
use crate::error::FilterError;
use crate::image::{Frame, Image};

// ============================================================================
// Emboss
// ============================================================================

const EMBOSS_KERNEL: [[f32; 3]; 3] = [[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]];

/// Emboss with a diagonal relief kernel around mid-gray (u8 version).
///
/// Flat regions map to `value + 128`. The 1-pixel border and alpha are
/// copied from the input.
pub fn emboss_rgba_u8(input: ArrayView3<u8>) -> Array3<u8> {
    convolve_3x3_rgb(input, &EMBOSS_KERNEL, 128.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Emboss;

impl Filter for Emboss {
    fn name(&self) -> &str {
        "Emboss"
    }

    fn apply(&self, image: &Image) -> Result<Image, FilterError> {
        Ok(image.with_pixels(emboss_rgba_u8(image.view())))
    }
}

// ============================================================================
// Vintage
// ============================================================================

/// Darkening at the corners relative to the center.
const VIGNETTE_STRENGTH: f64 = 0.4;

/// Warm color grade plus radial vignette (u8 version).
///
/// Grade: `R' = min(255, 1.2R + 20)`, `G' = min(255, 1.1G + 10)`,
/// `B' = min(255, 0.8B - 10)`, each truncated toward zero. The vignette
/// multiplier is `1 - 0.4 * d / dmax`, with `d` the distance from the full
/// image's center and `dmax` the center-to-corner distance.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `frame` - Placement of `input` within the full image
pub fn vintage_rgba_u8(input: ArrayView3<u8>, frame: Frame) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 4));

    let center_x = frame.full_width as f64 / 2.0;
    let center_y = frame.full_height as f64 / 2.0;
    let max_distance = (center_x * center_x + center_y * center_y).sqrt();

    for y in 0..height {
        for x in 0..width {
            let r = input[[y, x, 0]] as f64;
            let g = input[[y, x, 1]] as f64;
            let b = input[[y, x, 2]] as f64;

            let graded = [
                (r * 1.2 + 20.0).min(255.0) as i32,
                (g * 1.1 + 10.0).min(255.0) as i32,
                (b * 0.8 - 10.0).min(255.0) as i32,
            ];

            let dx = (frame.x as usize + x) as f64 - center_x;
            let dy = (frame.y as usize + y) as f64 - center_y;
            let distance = (dx * dx + dy * dy).sqrt();
            let vignette = 1.0 - (distance / max_distance) * VIGNETTE_STRENGTH;

            for c in 0..3 {
                output[[y, x, c]] = (graded[c] as f64 * vignette).clamp(0.0, 255.0) as u8;
            }
            output[[y, x, 3]] = input[[y, x, 3]];
        }
    }

    output
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Vintage;

impl Filter for Vintage {
    fn name(&self) -> &str {
        "Vintage"
    }

    fn apply(&self, image: &Image) -> Result<Image, FilterError> {
        Ok(image.with_pixels(vintage_rgba_u8(image.view(), image.frame())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::Tile;

    #[test]
    fn test_emboss_flat_is_offset_gray() {
        let img = Image::filled(4, 4, [50, 100, 200, 255]);
        let out = Emboss.apply(&img).unwrap();
        // Kernel sums to 1, so a flat region gives value + 128
        assert_eq!(out.pixel(1, 1), [178, 228, 255, 255]);
        // Border copied through
        assert_eq!(out.pixel(0, 0), [50, 100, 200, 255]);
    }

    #[test]
    fn test_emboss_preserves_alpha() {
        let img = Image::filled(3, 3, [10, 10, 10, 77]);
        let out = Emboss.apply(&img).unwrap();
        assert_eq!(out.pixel(1, 1)[3], 77);
    }

    #[test]
    fn test_vintage_center_brighter_than_corner() {
        let img = Image::filled(40, 40, [100, 100, 100, 255]);
        let out = Vintage.apply(&img).unwrap();
        // Exact center: vignette 1.0 -> (140, 120, 70)
        assert_eq!(out.pixel(20, 20), [140, 120, 70, 255]);
        assert!(out.pixel(0, 0)[0] < out.pixel(20, 20)[0]);
    }

    #[test]
    fn test_vintage_black_blue_floors_at_zero() {
        let img = Image::filled(2, 2, [0, 0, 0, 255]);
        let out = Vintage.apply(&img).unwrap();
        assert_eq!(out.pixel(1, 1)[2], 0);
    }

    #[test]
    fn test_vintage_tile_matches_whole_image_region() {
        let mut img = Image::new(30, 20);
        for y in 0..20 {
            for x in 0..30 {
                img.put_pixel(x, y, [(x * 8) as u8, (y * 12) as u8, 90, 255]);
            }
        }
        let tile = Tile {
            x: 10,
            y: 10,
            width: 10,
            height: 10,
        };
        let whole = Vintage.apply(&img).unwrap();
        let tiled = Vintage.apply(&img.region(tile)).unwrap();
        assert_eq!(tiled.view(), whole.region(tile).view());
    }
}
