//! WebAssembly exports for TileStag filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Browsers
//! usually run them from a Web Worker per tile, so each call filters one
//! buffer in a single pass without touching the thread pool.

use wasm_bindgen::prelude::*;

use crate::filters::FilterRegistry;
use crate::image::Image;

// ============================================================================
// Filter Lookup
// ============================================================================

/// Names of the available filters, in registration order.
#[wasm_bindgen]
pub fn filter_names_wasm() -> Vec<String> {
    FilterRegistry::builtin()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Filtering - u8 (8-bit)
// ============================================================================

/// Apply a named filter to an RGBA u8 image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `filter_name` - One of `filter_names_wasm()`
///
/// # Returns
/// Flat array of filtered RGBA bytes, or an error for unknown filters and
/// buffers of the wrong length
#[wasm_bindgen]
pub fn apply_filter_wasm(data: &[u8], width: u32, height: u32, filter_name: &str) -> Result<Vec<u8>, JsError> {
    let registry = FilterRegistry::builtin();
    let filter = registry
        .lookup(filter_name)
        .ok_or_else(|| JsError::new(&format!("unknown filter '{filter_name}'")))?;

    let input = Image::from_rgba(width, height, data.to_vec())?;
    let output = filter.apply(&input)?;
    Ok(output.into_raw())
}
