//! Filter modules for image processing effects.
//!
//! ## Supported Format
//!
//! All filters operate on RGBA8 [`Image`]s, stored as `(H, W, 4)` arrays.
//! The alpha channel is always preserved unchanged.
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Pure** - `apply` reads its input and returns a newly allocated image
//! - **Thread-safe** - filters are `Send + Sync` and hold no mutable state,
//!   so one instance serves every worker of the tile engine
//! - **Frame-aware** - output keeps the input's [`Frame`](crate::image::Frame);
//!   position-dependent effects read it so a tile renders like the same
//!   region of the whole image
//!
//! ## Filter Categories
//!
//! - **Pixel-wise**: grayscale, sepia, color boost (tile-local, seam-free)
//! - **Positional**: vintage (vignette uses the frame, seam-free)
//! - **Neighborhood**: blur, sharpen, edge detection, emboss. These read
//!   neighbors, so tiled output has visible seams at tile boundaries.
//!   Tiles are never padded with neighbor pixels.

pub mod blur;
pub mod color_adjust;
pub mod color_science;
pub mod core;
pub mod edge;
pub mod grayscale;
pub mod registry;
pub mod sharpen;
pub mod stylize;

use crate::error::FilterError;
use crate::image::Image;

pub use blur::GaussianBlur;
pub use color_adjust::Sepia;
pub use color_science::ColorBoost;
pub use edge::EdgeDetection;
pub use grayscale::Grayscale;
pub use registry::FilterRegistry;
pub use sharpen::Sharpen;
pub use stylize::{Emboss, Vintage};

/// A pure image-to-image transformation.
///
/// Implementations must be callable from many threads at once and must not
/// depend on anything but the input image (and its frame).
pub trait Filter: Send + Sync {
    /// Display name, as registered in [`FilterRegistry::builtin`].
    fn name(&self) -> &str;

    fn apply(&self, image: &Image) -> Result<Image, FilterError>;
}
