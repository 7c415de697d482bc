//! Compose settled tile tasks into the final image.

use crate::engine::TileOutcome;
use crate::error::FilterError;
use crate::image::Image;
use crate::tiling::Tile;

/// A tile whose filter failed; its region is missing from the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFailure {
    pub placement: Tile,
    pub error: FilterError,
}

#[derive(Debug)]
pub struct Assembly {
    pub image: Image,
    pub tiles_painted: usize,
    pub failures: Vec<TileFailure>,
    pub tiles_cancelled: usize,
}

/// Paint every successful tile onto a fresh `width` x `height` image.
///
/// Outcomes are visited in order. Failed and cancelled tiles are skipped,
/// leaving transparent black where they would have gone.
pub fn assemble(width: u32, height: u32, outcomes: &[TileOutcome]) -> Assembly {
    let mut image = Image::new(width, height);
    let mut tiles_painted = 0;
    let mut failures = Vec::new();
    let mut tiles_cancelled = 0;

    for outcome in outcomes {
        match outcome {
            TileOutcome::Done(result) => {
                image.draw(&result.image, result.placement.x, result.placement.y);
                tiles_painted += 1;
            }
            TileOutcome::Failed { placement, error } => {
                tracing::warn!(x = placement.x, y = placement.y, error = %error, "tile missing from output");
                failures.push(TileFailure {
                    placement: *placement,
                    error: error.clone(),
                });
            }
            TileOutcome::Cancelled(_) => tiles_cancelled += 1,
        }
    }

    Assembly {
        image,
        tiles_painted,
        failures,
        tiles_cancelled,
    }
}
