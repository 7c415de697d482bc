//! Tile planning: split an image into a grid of equal square tiles.
//!
//! A plan succeeds only when the tile edge divides both image dimensions.
//! Otherwise the error carries the remainders and a short list of tile
//! edges that would have worked.

use crate::error::{TileError, TileSuggestions};

/// Preferred suggestion range, searched in steps of [`SUGGEST_STEP`].
const SUGGEST_MIN: u32 = 20;
const SUGGEST_MAX: u32 = 100;
const SUGGEST_STEP: usize = 5;

/// Fallback search floor and result cap when the preferred range is empty.
const FALLBACK_MIN: u32 = 10;
const FALLBACK_LIMIT: usize = 5;

/// Placement of a rectangular region in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn overlaps(&self, other: &Tile) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Ordered tile placements covering an image exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_edge: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile_edge(&self) -> u32 {
        self.tile_edge
    }

    /// Dimensions of the image the grid was planned for.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Plan a grid of `tile_edge`-sized tiles over a `width` x `height` image.
///
/// Tiles are ordered column-major: all tiles of the first column top to
/// bottom, then the next column.
pub fn plan(width: u32, height: u32, tile_edge: u32) -> Result<TileGrid, TileError> {
    if tile_edge == 0 {
        return Err(TileError::ZeroEdge);
    }

    let remainder_w = width % tile_edge;
    let remainder_h = height % tile_edge;
    if remainder_w != 0 || remainder_h != 0 {
        return Err(TileError::Indivisible {
            width,
            height,
            tile_edge,
            remainder_w,
            remainder_h,
            suggestions: suggest_tile_edges(width, height),
        });
    }

    let columns = width / tile_edge;
    let rows = height / tile_edge;
    let mut tiles = Vec::with_capacity(columns as usize * rows as usize);
    for i in 0..columns {
        for j in 0..rows {
            tiles.push(Tile {
                x: i * tile_edge,
                y: j * tile_edge,
                width: tile_edge,
                height: tile_edge,
            });
        }
    }

    Ok(TileGrid {
        width,
        height,
        tile_edge,
        tiles,
    })
}

/// Tile edges that evenly divide both dimensions.
///
/// Prefers multiples of 5 in `[20, 100]`; if none qualify, falls back to the
/// first few common divisors of at least 10.
pub fn suggest_tile_edges(width: u32, height: u32) -> TileSuggestions {
    let divides_both = |edge: u32| width % edge == 0 && height % edge == 0;

    let preferred: Vec<u32> = (SUGGEST_MIN..=SUGGEST_MAX)
        .step_by(SUGGEST_STEP)
        .filter(|&edge| divides_both(edge))
        .collect();
    if !preferred.is_empty() {
        return TileSuggestions(preferred);
    }

    let fallback = (FALLBACK_MIN..=width.min(height))
        .filter(|&edge| divides_both(edge))
        .take(FALLBACK_LIMIT)
        .collect();
    TileSuggestions(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_zero_edge() {
        assert_eq!(plan(40, 40, 0).unwrap_err(), TileError::ZeroEdge);
    }

    #[test]
    fn test_plan_column_major_order() {
        let grid = plan(40, 60, 20).unwrap();
        let origins: Vec<(u32, u32)> = grid.tiles().iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(
            origins,
            vec![(0, 0), (0, 20), (0, 40), (20, 0), (20, 20), (20, 40)]
        );
        assert_eq!(grid.dimensions(), (40, 60));
        assert_eq!(grid.tile_edge(), 20);
    }

    #[test]
    fn test_plan_50_80_7() {
        match plan(50, 80, 7).unwrap_err() {
            TileError::Indivisible {
                remainder_w,
                remainder_h,
                suggestions,
                ..
            } => {
                assert_eq!((remainder_w, remainder_h), (1, 3));
                // No multiple of 5 in [20, 100] divides 50 and 80; 10 does.
                assert_eq!(suggestions.as_slice(), &[10]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_40_80_7_suggests_common_divisors() {
        match plan(40, 80, 7).unwrap_err() {
            TileError::Indivisible { suggestions, .. } => {
                assert_eq!(suggestions.as_slice(), &[20, 40]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_suggestions_none_found() {
        // 13 and 17 share no divisor >= 10.
        let s = suggest_tile_edges(13, 17);
        assert!(s.is_empty());
        assert_eq!(s.to_string(), "none found");
    }

    #[test]
    fn test_fallback_limited_to_five() {
        // 1512 = 2^3 * 3^3 * 7 has no factor of 5.
        let s = suggest_tile_edges(1512, 1512);
        assert_eq!(s.as_slice(), &[12, 14, 18, 21, 24]);
    }

    #[test]
    fn test_grid_partitions_image_exactly() {
        for width in 1..=48u32 {
            for height in 1..=48u32 {
                for edge in 1..=12u32 {
                    let Ok(grid) = plan(width, height, edge) else {
                        continue;
                    };
                    let area: u64 = grid.tiles().iter().map(Tile::area).sum();
                    assert_eq!(area, width as u64 * height as u64);
                    for (a, ta) in grid.tiles().iter().enumerate() {
                        assert!(ta.x + ta.width <= width && ta.y + ta.height <= height);
                        for tb in &grid.tiles()[a + 1..] {
                            assert!(!ta.overlaps(tb), "{ta:?} overlaps {tb:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_suggestions_divide_both_dimensions() {
        for width in 1..=200u32 {
            for height in (1..=200u32).step_by(7) {
                for edge in [3u32, 7, 9, 11] {
                    if let Err(TileError::Indivisible { suggestions, .. }) =
                        plan(width, height, edge)
                    {
                        for &s in suggestions.as_slice() {
                            assert_eq!(width % s, 0);
                            assert_eq!(height % s, 0);
                        }
                    }
                }
            }
        }
    }
}
