//! Error types for tile planning, filtering and job execution.
//!
//! Every fallible operation in the crate returns one of these enums.
//! [`EngineError`] is the umbrella type returned by the processing entry
//! point and wraps the narrower errors with `#[from]`.

use std::fmt;

/// Errors raised while constructing an [`Image`](crate::image::Image).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    /// A flat RGBA buffer did not hold `width * height * 4` bytes.
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// An array had a channel count other than 3 (RGB) or 4 (RGBA).
    #[error("unsupported channel count {0}, expected 3 (RGB) or 4 (RGBA)")]
    Channels(usize),
}

/// Tile edges that evenly divide both image dimensions.
///
/// Displays as a bracketed list, or as `none found` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileSuggestions(pub Vec<u32>);

impl TileSuggestions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for TileSuggestions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none found");
        }
        f.write_str("[")?;
        for (i, edge) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{edge}")?;
        }
        f.write_str("]")
    }
}

/// Tile decomposition failures. Reported before any work is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
    #[error("tile edge must be at least 1 pixel")]
    ZeroEdge,

    #[error(
        "tile size {tile_edge} doesn't divide image dimensions {width}x{height} evenly \
         (width remainder: {remainder_w}, height remainder: {remainder_h}); \
         try tile sizes like: {suggestions}"
    )]
    Indivisible {
        width: u32,
        height: u32,
        tile_edge: u32,
        remainder_w: u32,
        remainder_h: u32,
        suggestions: TileSuggestions,
    },
}

/// A single filter invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("filter '{filter}' failed: {reason}")]
    Failed { filter: String, reason: String },

    #[error("filter '{filter}' panicked: {message}")]
    Panicked { filter: String, message: String },
}

impl FilterError {
    pub fn failed(filter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            filter: filter.into(),
            reason: reason.into(),
        }
    }
}

/// The consumer side of the render queue has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("render queue consumer disconnected")]
    Disconnected,
}

/// Errors returned by the processing engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Tile(#[from] TileError),

    /// Synchronous mode only; tiled mode isolates filter failures per tile.
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("tile grid was planned for {grid_width}x{grid_height} but the image is {width}x{height}")]
    GridMismatch {
        grid_width: u32,
        grid_height: u32,
        width: u32,
        height: u32,
    },

    #[error("invalid engine configuration: {0}")]
    Config(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
