//! Gaussian blur for RGBA images.
//!
//! Full 2D convolution with a normalized Gaussian kernel. Pixels whose
//! kernel footprint would leave the image are copied through unchanged
//! (no edge extrapolation), so each tile keeps a sharp rim about
//! `kernel_size / 2` pixels wide when blurred tile by tile.

use ndarray::{Array3, ArrayView3};

use super::core::gaussian_kernel_2d;
use super::Filter;
use crate::error::FilterError;
use crate::image::Image;

pub const DEFAULT_KERNEL_SIZE: usize = 3;
const MAX_KERNEL_SIZE: usize = 9;

/// Apply Gaussian blur to an RGBA image.
///
/// Alpha is copied from the input. The kernel is anchored at index
/// `(kernel_size - 1) / 2` and applied flipped (a true convolution), so for
/// even sizes the untouched rim is one pixel wider on the right and bottom.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4) as u8
/// * `kernel_size` - Kernel edge length, `sigma = kernel_size / 3`
///
/// # Returns
/// Blurred RGBA image with same dimensions
pub fn gaussian_blur_rgba_u8(input: ArrayView3<u8>, kernel_size: usize) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let kernel = gaussian_kernel_2d(kernel_size);
    let size = kernel.dim().0;

    // Offsets run from -before to +after around the target pixel
    let before = (size - 1) / 2;
    let after = size - 1 - before;

    let mut output = input.to_owned();
    if width < size || height < size {
        return output;
    }

    for y in before..height - after {
        for x in before..width - after {
            let mut sum = [0.0f32; 3];
            for ky in 0..size {
                for kx in 0..size {
                    let weight = kernel[[size - 1 - ky, size - 1 - kx]];
                    let py = y + ky - before;
                    let px = x + kx - before;
                    for c in 0..3 {
                        sum[c] += input[[py, px, c]] as f32 * weight;
                    }
                }
            }
            for c in 0..3 {
                output[[y, x, c]] = (sum[c] + 0.5).clamp(0.0, 255.0) as u8;
            }
        }
    }

    output
}

#[derive(Debug, Clone, Copy)]
pub struct GaussianBlur {
    kernel_size: usize,
}

impl GaussianBlur {
    /// `kernel_size` is clamped to `[1, 9]`.
    pub fn new(kernel_size: usize) -> Self {
        Self {
            kernel_size: kernel_size.clamp(1, MAX_KERNEL_SIZE),
        }
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self::new(DEFAULT_KERNEL_SIZE)
    }
}

impl Filter for GaussianBlur {
    fn name(&self) -> &str {
        "Blur"
    }

    fn apply(&self, image: &Image) -> Result<Image, FilterError> {
        Ok(image.with_pixels(gaussian_blur_rgba_u8(image.view(), self.kernel_size)))
    }
}
