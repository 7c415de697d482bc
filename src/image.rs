//! RGBA8 image buffer shared by filters, the engine and the render queue.
//!
//! Pixels are stored as an `ndarray::Array3<u8>` of shape
//! `(height, width, 4)`, the same layout used by the filter modules.
//!
//! Each image also carries a [`Frame`]: where it sits inside the image it was
//! cut from. Whole images are their own frame; tiles produced by
//! [`Image::region`] remember their placement so position-dependent filters
//! can reproduce whole-image results on a tile.

use ndarray::{s, Array3, ArrayView3, ArrayViewMut3, Axis};

use crate::error::ImageError;
use crate::tiling::Tile;

/// RGBA channel count.
pub const CHANNELS: usize = 4;

/// Placement of an image inside the full image it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Offset of this image's left column within the full image.
    pub x: u32,
    /// Offset of this image's top row within the full image.
    pub y: u32,
    /// Width of the full image.
    pub full_width: u32,
    /// Height of the full image.
    pub full_height: u32,
}

impl Frame {
    fn whole(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            full_width: width,
            full_height: height,
        }
    }
}

/// An owned RGBA8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pixels: Array3<u8>,
    frame: Frame,
}

impl Image {
    /// Transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: Array3::<u8>::zeros((height as usize, width as usize, CHANNELS)),
            frame: Frame::whole(width, height),
        }
    }

    /// Image filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut image = Self::new(width, height);
        for mut px in image.pixels.lanes_mut(Axis(2)) {
            for c in 0..CHANNELS {
                px[c] = rgba[c];
            }
        }
        image
    }

    /// Build from a flat row-major RGBA buffer.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        let pixels = Array3::from_shape_vec((height as usize, width as usize, CHANNELS), data)
            .map_err(|_| ImageError::BufferSize {
                width,
                height,
                expected,
                actual: expected,
            })?;
        Ok(Self {
            pixels,
            frame: Frame::whole(width, height),
        })
    }

    /// Build from a `(height, width, channels)` array with 3 or 4 channels.
    ///
    /// RGB input gets an opaque alpha channel.
    pub fn from_array(input: ArrayView3<u8>) -> Result<Self, ImageError> {
        let (height, width, channels) = input.dim();
        let pixels = match channels {
            4 => input.to_owned(),
            3 => {
                let mut output = Array3::<u8>::zeros((height, width, CHANNELS));
                for y in 0..height {
                    for x in 0..width {
                        for c in 0..3 {
                            output[[y, x, c]] = input[[y, x, c]];
                        }
                        output[[y, x, 3]] = 255;
                    }
                }
                output
            }
            other => return Err(ImageError::Channels(other)),
        };
        Ok(Self {
            pixels,
            frame: Frame::whole(width as u32, height as u32),
        })
    }

    /// Wrap filter output, keeping this image's frame.
    ///
    /// `pixels` must be an RGBA array of the same size.
    pub fn with_pixels(&self, pixels: Array3<u8>) -> Image {
        debug_assert_eq!(pixels.dim(), self.pixels.dim());
        Image {
            pixels,
            frame: self.frame,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Read one pixel. Panics if out of bounds, like array indexing.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let (x, y) = (x as usize, y as usize);
        [
            self.pixels[[y, x, 0]],
            self.pixels[[y, x, 1]],
            self.pixels[[y, x, 2]],
            self.pixels[[y, x, 3]],
        ]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let (x, y) = (x as usize, y as usize);
        for c in 0..CHANNELS {
            self.pixels[[y, x, c]] = rgba[c];
        }
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.pixels.view_mut()
    }

    /// Flat row-major RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        let (raw, _) = self.pixels.as_standard_layout().into_owned().into_raw_vec_and_offset();
        raw
    }

    pub fn into_array(self) -> Array3<u8> {
        self.pixels
    }

    /// Copy out the pixels under `tile`.
    ///
    /// The result's frame records the tile's placement inside this image.
    /// The tile must lie within bounds.
    pub fn region(&self, tile: Tile) -> Image {
        let (x0, y0) = (tile.x as usize, tile.y as usize);
        let (x1, y1) = (x0 + tile.width as usize, y0 + tile.height as usize);
        Image {
            pixels: self.pixels.slice(s![y0..y1, x0..x1, ..]).to_owned(),
            frame: Frame {
                x: self.frame.x + tile.x,
                y: self.frame.y + tile.y,
                full_width: self.frame.full_width,
                full_height: self.frame.full_height,
            },
        }
    }

    /// Paste `source` with its top-left corner at `(x, y)`, clipping to bounds.
    pub fn draw(&mut self, source: &Image, x: u32, y: u32) {
        let (x0, y0) = (x as usize, y as usize);
        let (dst_h, dst_w, _) = self.pixels.dim();
        if x0 >= dst_w || y0 >= dst_h {
            return;
        }
        let w = (source.width() as usize).min(dst_w - x0);
        let h = (source.height() as usize).min(dst_h - y0);
        self.pixels
            .slice_mut(s![y0..y0 + h, x0..x0 + w, ..])
            .assign(&source.pixels.slice(s![0..h, 0..w, ..]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let img = Image::new(3, 2);
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        assert_eq!(img.pixel(2, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_filled() {
        let img = Image::filled(4, 4, [255, 0, 0, 255]);
        assert_eq!(img.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(img.pixel(3, 3), [255, 0, 0, 255]);
    }

    #[test]
    fn test_from_rgba_rejects_wrong_length() {
        let err = Image::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            ImageError::BufferSize {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_from_array_rgb_gets_opaque_alpha() {
        let mut arr = Array3::<u8>::zeros((1, 2, 3));
        arr[[0, 1, 0]] = 9;
        let img = Image::from_array(arr.view()).unwrap();
        assert_eq!(img.pixel(1, 0), [9, 0, 0, 255]);
    }

    #[test]
    fn test_from_array_rejects_two_channels() {
        let arr = Array3::<u8>::zeros((1, 1, 2));
        assert_eq!(Image::from_array(arr.view()).unwrap_err(), ImageError::Channels(2));
    }

    #[test]
    fn test_region_copies_pixels_and_records_frame() {
        let mut img = Image::new(4, 4);
        img.put_pixel(2, 3, [1, 2, 3, 4]);
        let tile = img.region(Tile {
            x: 2,
            y: 2,
            width: 2,
            height: 2,
        });
        assert_eq!(tile.width(), 2);
        assert_eq!(tile.pixel(0, 1), [1, 2, 3, 4]);
        assert_eq!(
            tile.frame(),
            Frame {
                x: 2,
                y: 2,
                full_width: 4,
                full_height: 4
            }
        );
    }

    #[test]
    fn test_draw_clips_at_edges() {
        let mut canvas = Image::new(3, 3);
        let patch = Image::filled(2, 2, [7, 7, 7, 255]);
        canvas.draw(&patch, 2, 2);
        assert_eq!(canvas.pixel(2, 2), [7, 7, 7, 255]);
        assert_eq!(canvas.pixel(1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_into_raw_row_major() {
        let mut img = Image::new(2, 1);
        img.put_pixel(1, 0, [5, 6, 7, 8]);
        assert_eq!(img.into_raw(), vec![0, 0, 0, 0, 5, 6, 7, 8]);
    }
}
