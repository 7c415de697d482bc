//! TileStag
//!
//! Tile-parallel image filtering with progressive rendering, with optional
//! Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Images are RGBA8, stored as `(height, width, 4)` `ndarray` arrays.
//! Python callers may also pass RGB `(height, width, 3)` arrays, which get
//! an opaque alpha channel.
//!
//! ## Processing Model
//! - [`tiling`] splits an image into equal square tiles, or explains why the
//!   requested tile size doesn't fit and suggests ones that do
//! - [`engine`] filters each tile on a bounded worker pool, pushes finished
//!   tiles to the [`render_queue`] as they complete, waits for all of them
//!   and hands the results to the [`assembler`]
//! - synchronous mode filters the whole image in one pass instead
//!
//! Filters are looked up by name in a [`FilterRegistry`] built once at
//! startup.
//!
//! ```no_run
//! use tilestag::{render_queue, EngineConfig, FilterRegistry, Image, Mode, TileEngine};
//!
//! let registry = FilterRegistry::builtin();
//! let (sink, queue) = render_queue::channel();
//! let engine = TileEngine::new(EngineConfig::default(), sink)?;
//!
//! let image = Image::filled(400, 200, [255, 0, 0, 255]);
//! if let Some(filter) = registry.lookup("Sepia") {
//!     let output = engine.process_image(&image, 40, filter.as_ref(), Mode::Asynchronous)?;
//!     let mut canvas = Image::new(output.width(), output.height());
//!     queue.paint_pending(&mut canvas);
//! }
//! # Ok::<(), tilestag::EngineError>(())
//! ```

pub mod assembler;
pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod image;
pub mod render_queue;
pub mod tiling;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::EngineConfig;
pub use engine::{CancelToken, JobReport, Mode, TileEngine};
pub use error::{EngineError, FilterError, ImageError, QueueError, TileError, TileSuggestions};
pub use filters::{Filter, FilterRegistry};
pub use image::Image;
pub use render_queue::{RenderItem, RenderQueue, RenderSink, RenderSurface, TileResult};
pub use tiling::{Tile, TileGrid};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use std::sync::OnceLock;

    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::config::EngineConfig;
    use crate::engine::{Mode, TileEngine};
    use crate::filters::FilterRegistry;
    use crate::image::Image;
    use crate::render_queue::RenderSink;

    fn registry() -> &'static FilterRegistry {
        static REGISTRY: OnceLock<FilterRegistry> = OnceLock::new();
        REGISTRY.get_or_init(FilterRegistry::builtin)
    }

    /// One engine and worker pool for the whole interpreter.
    ///
    /// There is no display loop on this side, so tiles go to a discarding sink.
    fn engine() -> PyResult<&'static TileEngine> {
        static ENGINE: OnceLock<TileEngine> = OnceLock::new();
        if let Some(engine) = ENGINE.get() {
            return Ok(engine);
        }
        let engine = TileEngine::new(EngineConfig::default(), RenderSink::discard())
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(ENGINE.get_or_init(|| engine))
    }

    // ========================================================================
    // Filter Lookup
    // ========================================================================

    /// Names of the available filters, in registration order.
    #[pyfunction]
    pub fn filter_names() -> Vec<String> {
        registry().names().into_iter().map(str::to_string).collect()
    }

    // ========================================================================
    // Processing
    // ========================================================================

    /// Apply a named filter to an RGB or RGBA u8 image.
    ///
    /// # Arguments
    /// * `image` - Input image (height, width, 3 or 4)
    /// * `tile_edge` - Tile edge in pixels, or `None` for the configured
    ///   default (ignored unless `asynchronous`)
    /// * `filter_name` - One of `filter_names()`
    /// * `asynchronous` - Process in parallel tiles instead of one pass
    ///
    /// Raises `ValueError` for unknown filters, unsupported shapes and tile
    /// sizes that don't divide the image.
    #[pyfunction]
    #[pyo3(signature = (image, tile_edge=None, filter_name="Grayscale", asynchronous=true))]
    pub fn process_image<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        tile_edge: Option<u32>,
        filter_name: &str,
        asynchronous: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let filter = registry()
            .lookup(filter_name)
            .ok_or_else(|| PyValueError::new_err(format!("unknown filter '{filter_name}'")))?;
        let input = Image::from_array(image.as_array()).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let mode = if asynchronous {
            Mode::Asynchronous
        } else {
            Mode::Synchronous
        };

        let engine = engine()?;
        let tile_edge = engine.config().tile_edge_or_default(tile_edge);

        let output = py
            .allow_threads(|| engine.process_image(&input, tile_edge, filter.as_ref(), mode))
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(output.into_array().into_pyarray(py))
    }

    /// TileStag Rust extension module
    #[pymodule]
    pub fn tilestag(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(filter_names, m)?)?;
        m.add_function(wrap_pyfunction!(process_image, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::tilestag;
