//! Color science filters: Color Boost (HSB saturation).
//!
//! Uses the HSB model with hue normalized to `[0, 1)`. Conversions are done
//! in `f32` and the way back rounds with `+0.5`, so a pixel whose saturation
//! is not changed comes back unchanged.

use ndarray::{Array3, ArrayView3};

use super::Filter;
use crate::error::FilterError;
use crate::image::Image;

/// Default saturation multiplier.
pub const DEFAULT_BOOST: f64 = 1.5;
const MIN_BOOST: f64 = 0.1;
const MAX_BOOST: f64 = 3.0;

// ============================================================================
// HSB Conversion
// ============================================================================

/// Convert RGB (0-255) to HSB with all components in 0.0-1.0.
pub fn rgb_to_hsb(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (ri, gi, bi) = (r as i32, g as i32, b as i32);
    let cmax = ri.max(gi).max(bi);
    let cmin = ri.min(gi).min(bi);

    let brightness = cmax as f32 / 255.0;
    let saturation = if cmax != 0 {
        (cmax - cmin) as f32 / cmax as f32
    } else {
        0.0
    };

    let hue = if saturation == 0.0 {
        0.0
    } else {
        let span = (cmax - cmin) as f32;
        let redc = (cmax - ri) as f32 / span;
        let greenc = (cmax - gi) as f32 / span;
        let bluec = (cmax - bi) as f32 / span;
        let sector = if ri == cmax {
            bluec - greenc
        } else if gi == cmax {
            2.0 + redc - bluec
        } else {
            4.0 + greenc - redc
        };
        let h = sector / 6.0;
        if h < 0.0 {
            h + 1.0
        } else {
            h
        }
    };

    (hue, saturation, brightness)
}

/// Convert HSB (0.0-1.0) back to RGB (0-255).
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> [u8; 3] {
    let scale = |v: f32| (v * 255.0 + 0.5) as u8;

    if saturation == 0.0 {
        let v = scale(brightness);
        return [v, v, v];
    }

    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));

    match h as i32 {
        0 => [scale(brightness), scale(t), scale(p)],
        1 => [scale(q), scale(brightness), scale(p)],
        2 => [scale(p), scale(brightness), scale(t)],
        3 => [scale(p), scale(q), scale(brightness)],
        4 => [scale(t), scale(p), scale(brightness)],
        5 => [scale(brightness), scale(p), scale(q)],
        _ => [0, 0, 0],
    }
}

// ============================================================================
// Color Boost
// ============================================================================

/// Multiply HSB saturation by `boost`, capped at 1.0 (u8 version).
///
/// Grays (zero saturation) are left unchanged. Alpha is preserved.
pub fn color_boost_rgba_u8(input: ArrayView3<u8>, boost: f64) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 4));

    for y in 0..height {
        for x in 0..width {
            let (h, s, v) = rgb_to_hsb(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]);
            let boosted = ((s as f64 * boost) as f32).min(1.0);
            let [r, g, b] = hsb_to_rgb(h, boosted, v);

            output[[y, x, 0]] = r;
            output[[y, x, 1]] = g;
            output[[y, x, 2]] = b;
            output[[y, x, 3]] = input[[y, x, 3]];
        }
    }

    output
}

/// Saturation boost in HSB space.
#[derive(Debug, Clone, Copy)]
pub struct ColorBoost {
    boost: f64,
}

impl ColorBoost {
    /// `boost` is clamped to `[0.1, 3.0]`.
    pub fn new(boost: f64) -> Self {
        Self {
            boost: boost.clamp(MIN_BOOST, MAX_BOOST),
        }
    }

    pub fn boost(&self) -> f64 {
        self.boost
    }
}

impl Default for ColorBoost {
    fn default() -> Self {
        Self::new(DEFAULT_BOOST)
    }
}

impl Filter for ColorBoost {
    fn name(&self) -> &str {
        "Color Boost"
    }

    fn apply(&self, image: &Image) -> Result<Image, FilterError> {
        Ok(image.with_pixels(color_boost_rgba_u8(image.view(), self.boost)))
    }
}
