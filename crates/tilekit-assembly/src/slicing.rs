//! Tile geometry for a cropped region.
//!
//! Only the records are produced here; cutting pixels is left to whoever
//! owns the image.

use tilekit_core::constants::MAX_TILE_COUNT;
use tilekit_core::{
    CropSettings, GridLayout, GridPosition, Point, PuzzleError, Size, Tile, TileSettings,
};

/// Cuts a `region` into tiles of `settings` size, row-major.
///
/// Tiles on the right and bottom edges are clipped to the region, so they
/// can be narrower or shorter than requested. Ids are `tile-{index}`.
/// Empty regions, non-positive tile sizes and grids of more than
/// [`MAX_TILE_COUNT`] cells produce no tiles.
pub fn slice_tiles(region: Size, settings: &TileSettings) -> Vec<Tile> {
    if region.is_empty() || settings.width <= 0.0 || settings.height <= 0.0 {
        tracing::warn!(
            "Nothing to slice: region {}x{}, tile {}x{}",
            region.width,
            region.height,
            settings.width,
            settings.height
        );
        return Vec::new();
    }

    let layout = GridLayout::compute(&CropSettings::full_image(region), settings);
    let total = layout.total_cells();
    if total > MAX_TILE_COUNT {
        tracing::warn!(
            "Nothing to slice: {}",
            PuzzleError::out_of_range("tile count", total)
        );
        return Vec::new();
    }
    let mut tiles = Vec::with_capacity(total as usize);

    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let grid = GridPosition::new(row, col);
            let origin = layout.cell_origin(grid);
            let index = (row * layout.cols + col) as usize;
            tiles.push(Tile::new(
                format!("tile-{}", index),
                settings.width.min(region.width - origin.x),
                settings.height.min(region.height - origin.y),
                Point::new(origin.x, origin.y),
                grid,
                index,
            ));
        }
    }

    tracing::debug!(
        "Sliced {}x{} region into {} tiles ({}x{})",
        region.width,
        region.height,
        tiles.len(),
        layout.cols,
        layout.rows
    );
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_fit() {
        let tiles = slice_tiles(Size::new(200.0, 100.0), &TileSettings::new(100.0, 100.0));
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].id, "tile-0");
        assert_eq!(tiles[1].id, "tile-1");
        assert_eq!(tiles[1].original_position, Point::new(100.0, 0.0));
        assert_eq!(tiles[1].grid_position, GridPosition::new(0, 1));
    }

    #[test]
    fn test_edge_tiles_are_clipped() {
        let tiles = slice_tiles(Size::new(250.0, 130.0), &TileSettings::new(100.0, 100.0));
        assert_eq!(tiles.len(), 6);

        let last_in_first_row = &tiles[2];
        assert_eq!(last_in_first_row.width, 50.0);
        assert_eq!(last_in_first_row.height, 100.0);

        let corner = &tiles[5];
        assert_eq!(corner.index, 5);
        assert_eq!(corner.grid_position, GridPosition::new(1, 2));
        assert_eq!(corner.original_position, Point::new(200.0, 100.0));
        assert_eq!((corner.width, corner.height), (50.0, 30.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(slice_tiles(Size::new(0.0, 100.0), &TileSettings::default()).is_empty());
        assert!(slice_tiles(Size::new(100.0, 100.0), &TileSettings::new(-1.0, 10.0)).is_empty());
    }

    #[test]
    fn test_oversized_grid_produces_nothing() {
        let huge = slice_tiles(Size::new(100_000.0, 100_000.0), &TileSettings::new(1.0, 1.0));
        assert!(huge.is_empty());

        let at_cap = slice_tiles(Size::new(100.0, 100.0), &TileSettings::new(1.0, 1.0));
        assert_eq!(at_cap.len(), MAX_TILE_COUNT as usize);
    }
}
