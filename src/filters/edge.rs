//! Edge detection: Sobel gradient magnitude.
//!
//! The gradient is computed on the BT.709 gray value of each neighbor and
//! written to all three color channels. The 1-pixel border is left as it
//! was in the input.

use ndarray::{Array3, ArrayView3};

use super::grayscale::luma;
use super::Filter;
use crate::error::FilterError;
use crate::image::Image;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Apply Sobel edge detection - u8 version.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
///
/// # Returns
/// Edge magnitude image; border pixels and alpha copied from the input
pub fn sobel_rgba_u8(input: ArrayView3<u8>) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = input.to_owned();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut gx = 0i32;
            let mut gy = 0i32;

            for ky in 0..3 {
                for kx in 0..3 {
                    let py = y + ky - 1;
                    let px = x + kx - 1;

                    // Gray level truncated to an integer before weighting
                    let gray = luma(input[[py, px, 0]], input[[py, px, 1]], input[[py, px, 2]]) as i32;

                    gx += gray * SOBEL_X[ky][kx];
                    gy += gray * SOBEL_Y[ky][kx];
                }
            }

            let magnitude = (((gx * gx + gy * gy) as f64).sqrt() as i32).clamp(0, 255) as u8;
            for c in 0..3 {
                output[[y, x, c]] = magnitude;
            }
        }
    }

    output
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetection;

impl Filter for EdgeDetection {
    fn name(&self) -> &str {
        "Edge Detection"
    }

    fn apply(&self, image: &Image) -> Result<Image, FilterError> {
        Ok(image.with_pixels(sobel_rgba_u8(image.view())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn border_pixels(w: u32, h: u32) -> Vec<(u32, u32)> {
        (0..w)
            .flat_map(|x| (0..h).map(move |y| (x, y)))
            .filter(|&(x, y)| x == 0 || y == 0 || x == w - 1 || y == h - 1)
            .collect()
    }

    #[test]
    fn test_sobel_uniform_interior_is_black_border_unchanged() {
        let img = Image::filled(6, 5, [30, 160, 220, 255]);
        let out = EdgeDetection.apply(&img).unwrap();

        for y in 1..4 {
            for x in 1..5 {
                assert_eq!(out.pixel(x, y), [0, 0, 0, 255]);
            }
        }
        for (x, y) in border_pixels(6, 5) {
            assert_eq!(out.pixel(x, y), img.pixel(x, y));
        }
    }

    #[test]
    fn test_sobel_detects_vertical_edge() {
        let mut img = Image::new(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                let v = if x < 2 { 0 } else { 255 };
                img.put_pixel(x, y, [v, v, v, 255]);
            }
        }

        let out = EdgeDetection.apply(&img).unwrap();

        // |gx| = 4 * 255 clamps to 255 at the boundary
        assert_eq!(out.pixel(2, 2), [255, 255, 255, 255]);
        assert_eq!(out.pixel(3, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_sobel_tiny_image_is_copy() {
        let img = Image::filled(2, 2, [1, 2, 3, 4]);
        assert_eq!(EdgeDetection.apply(&img).unwrap(), img);
    }
}
