//! Grayscale conversion filter.
//!
//! Uses ITU-R BT.709 luminosity coefficients. The weighted sum is rounded to
//! the nearest integer, which keeps the filter idempotent: a gray pixel maps
//! to itself.

use ndarray::{Array3, ArrayView3};

use super::Filter;
use crate::error::FilterError;
use crate::image::Image;

/// ITU-R BT.709 luminosity coefficients
pub const LUMA_R: f64 = 0.2126;
pub const LUMA_G: f64 = 0.7152;
pub const LUMA_B: f64 = 0.0722;

/// BT.709 weighted sum of an RGB triple, unrounded.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64
}

/// Convert RGBA u8 image to grayscale (luminosity method).
///
/// Output is RGBA with R=G=B=luminosity, A preserved.
///
/// # Arguments
/// * `input` - 3D array view of shape (height, width, 4) with RGBA u8 values (0-255)
///
/// # Returns
/// New array with grayscale values in RGB channels, alpha preserved
pub fn grayscale_rgba_u8(input: ArrayView3<u8>) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 4));

    for y in 0..height {
        for x in 0..width {
            let gray = luma(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]])
                .round()
                .clamp(0.0, 255.0) as u8;

            output[[y, x, 0]] = gray;
            output[[y, x, 1]] = gray;
            output[[y, x, 2]] = gray;
            output[[y, x, 3]] = input[[y, x, 3]];
        }
    }

    output
}

/// BT.709 grayscale.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl Filter for Grayscale {
    fn name(&self) -> &str {
        "Grayscale"
    }

    fn apply(&self, image: &Image) -> Result<Image, FilterError> {
        Ok(image.with_pixels(grayscale_rgba_u8(image.view())))
    }
}
