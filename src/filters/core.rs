//! Core utilities for neighborhood filters.
//!
//! This module provides shared functionality used by multiple filters:
//! - Gaussian kernel generation
//! - 3x3 convolution over RGB with identity borders

use ndarray::{Array2, Array3, ArrayView3};

/// Generate a normalized 2D Gaussian kernel of `size` x `size`.
///
/// `sigma = size / 3`, weight at offset `(x, y)` from the center is
/// `exp(-(x² + y²) / (2σ²))`, and the weights sum to 1.
///
/// # Arguments
/// * `size` - Kernel edge length (at least 1)
///
/// # Returns
/// Normalized kernel indexed `[y, x]`
pub fn gaussian_kernel_2d(size: usize) -> Array2<f32> {
    let size = size.max(1);
    let center = (size / 2) as i32;
    let sigma = size as f32 / 3.0;

    let mut kernel = Array2::<f32>::zeros((size, size));
    for ky in 0..size {
        for kx in 0..size {
            let x = kx as i32 - center;
            let y = ky as i32 - center;
            kernel[[ky, kx]] = (-((x * x + y * y) as f32) / (2.0 * sigma * sigma)).exp();
        }
    }

    // Normalize
    let sum: f32 = kernel.iter().sum();
    kernel.mapv_inplace(|v| v / sum);

    kernel
}

/// Convolve the RGB channels with a 3x3 kernel.
///
/// Each channel becomes `trunc(sum + offset)` clamped to 0-255. The 1-pixel
/// border and the alpha channel are copied from the input.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `kernel` - Weights indexed `[dy + 1][dx + 1]`
/// * `offset` - Bias added before clamping (128 for emboss)
pub fn convolve_3x3_rgb(input: ArrayView3<u8>, kernel: &[[f32; 3]; 3], offset: f32) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = input.to_owned();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut sum = [0.0f32; 3];
            for (ky, row) in kernel.iter().enumerate() {
                for (kx, &weight) in row.iter().enumerate() {
                    let py = y + ky - 1;
                    let px = x + kx - 1;
                    for c in 0..3 {
                        sum[c] += input[[py, px, c]] as f32 * weight;
                    }
                }
            }
            for c in 0..3 {
                // `as i32` truncates toward zero before clamping
                output[[y, x, c]] = ((sum[c] + offset) as i32).clamp(0, 255) as u8;
            }
        }
    }

    output
}
