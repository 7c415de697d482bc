//! Color adjustment filters: Sepia.
//!
//! Pixel-wise operation that doesn't require spatial context, so tiled and
//! whole-image output are identical.

use ndarray::{Array3, ArrayView3};

use super::Filter;
use crate::error::FilterError;
use crate::image::Image;

// ============================================================================
// Sepia
// ============================================================================

/// Apply the classic sepia tone matrix (u8 version).
///
/// Each output channel is a weighted sum of the input RGB, capped at 255 and
/// truncated. Alpha is preserved.
pub fn sepia_rgba_u8(input: ArrayView3<u8>) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 4));

    for y in 0..height {
        for x in 0..width {
            let r = input[[y, x, 0]] as f64;
            let g = input[[y, x, 1]] as f64;
            let b = input[[y, x, 2]] as f64;

            output[[y, x, 0]] = (0.393 * r + 0.769 * g + 0.189 * b).min(255.0) as u8;
            output[[y, x, 1]] = (0.349 * r + 0.686 * g + 0.168 * b).min(255.0) as u8;
            output[[y, x, 2]] = (0.272 * r + 0.534 * g + 0.131 * b).min(255.0) as u8;
            output[[y, x, 3]] = input[[y, x, 3]];
        }
    }

    output
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sepia;

impl Filter for Sepia {
    fn name(&self) -> &str {
        "Sepia"
    }

    fn apply(&self, image: &Image) -> Result<Image, FilterError> {
        Ok(image.with_pixels(sepia_rgba_u8(image.view())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sepia_white_saturates() {
        let img = Image::filled(1, 1, [255, 255, 255, 255]);
        let out = Sepia.apply(&img).unwrap();
        // 0.272 + 0.534 + 0.131 = 0.937 -> 238.935
        assert_eq!(out.pixel(0, 0), [255, 255, 238, 255]);
    }

    #[test]
    fn test_sepia_mid_gray() {
        let img = Image::filled(1, 1, [100, 100, 100, 40]);
        let out = Sepia.apply(&img).unwrap();
        // 135.1, 120.3, 93.7
        assert_eq!(out.pixel(0, 0), [135, 120, 93, 40]);
    }
}
