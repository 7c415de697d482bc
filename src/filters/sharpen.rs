//! Sharpen filter.

use ndarray::{Array3, ArrayView3};

use super::core::convolve_3x3_rgb;
use super::Filter;
use crate::error::FilterError;
use crate::image::Image;

const SHARPEN_KERNEL: [[f32; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// Sharpen with the 4-neighbor Laplacian kernel (u8 version).
///
/// The 1-pixel border and alpha are copied from the input.
pub fn sharpen_rgba_u8(input: ArrayView3<u8>) -> Array3<u8> {
    convolve_3x3_rgb(input, &SHARPEN_KERNEL, 0.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sharpen;

impl Filter for Sharpen {
    fn name(&self) -> &str {
        "Sharpen"
    }

    fn apply(&self, image: &Image) -> Result<Image, FilterError> {
        Ok(image.with_pixels(sharpen_rgba_u8(image.view())))
    }
}
