//! Tile and layout records shared by the placement engine, the viewport and
//! the settings store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

use crate::constants::DEFAULT_TILE_SIZE;
use crate::geometry::{Point, Rect, Size};

/// Row/column of a tile in the sliced grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: u32,
    pub col: u32,
}

impl GridPosition {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// A slice of the cropped image. Created once when the crop is sliced and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// Top-left of the tile inside the cropped region.
    pub original_position: Point,
    pub grid_position: GridPosition,
    /// Row-major index in the slicing order.
    pub index: usize,
}

impl Tile {
    pub fn new(
        id: impl Into<String>,
        width: f64,
        height: f64,
        original_position: Point,
        grid_position: GridPosition,
        index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            original_position,
            grid_position,
            index,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The rectangle this tile would cover with its top-left at `position`.
    pub fn rect_at(&self, position: Point) -> Rect {
        Rect::from_origin_size(position, self.size())
    }
}

/// A tile that has been given a position on the canvas.
///
/// Repositioning a tile replaces its `PlacedTile` rather than mutating it.
/// The tile record itself is shared, since tiles are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTile {
    tile: Arc<Tile>,
    pub position: Point,
    pub placed_at: DateTime<Utc>,
}

impl PlacedTile {
    pub fn new(tile: Arc<Tile>, position: Point) -> Self {
        Self {
            tile,
            position,
            placed_at: Utc::now(),
        }
    }

    pub fn tile(&self) -> &Arc<Tile> {
        &self.tile
    }

    /// Canvas-space rectangle covered by this tile.
    pub fn rect(&self) -> Rect {
        self.tile.rect_at(self.position)
    }
}

impl Deref for PlacedTile {
    type Target = Tile;

    fn deref(&self) -> &Tile {
        &self.tile
    }
}

/// Crop region in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSettings {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropSettings {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A crop covering a whole image.
    pub fn full_image(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl Default for CropSettings {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }
}

impl From<Rect> for CropSettings {
    fn from(r: Rect) -> Self {
        Self::new(r.x, r.y, r.width, r.height)
    }
}

/// Requested tile dimensions used for slicing and for the placement cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSettings {
    pub width: f64,
    pub height: f64,
}

impl TileSettings {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for TileSettings {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE)
    }
}

/// Grid derived from a crop and a tile size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridLayout {
    pub cols: u32,
    pub rows: u32,
    pub tile_width: f64,
    pub tile_height: f64,
}

impl GridLayout {
    /// `cols = ceil(crop.width / tile.width)`, `rows = ceil(crop.height / tile.height)`.
    /// Non-positive tile dimensions give an empty grid.
    pub fn compute(crop: &CropSettings, tiles: &TileSettings) -> Self {
        let count = |extent: f64, step: f64| -> u32 {
            if step > 0.0 && extent > 0.0 {
                (extent / step).ceil() as u32
            } else {
                0
            }
        };
        Self {
            cols: count(crop.width, tiles.width),
            rows: count(crop.height, tiles.height),
            tile_width: tiles.width,
            tile_height: tiles.height,
        }
    }

    pub fn total_cells(&self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }

    /// Canvas position of a grid cell's top-left corner.
    pub fn cell_origin(&self, grid: GridPosition) -> Point {
        Point::new(
            f64::from(grid.col) * self.tile_width,
            f64::from(grid.row) * self.tile_height,
        )
    }
}

/// Placement state captured for undo/redo.
///
/// Cloning is a structural copy: the vector is duplicated, tile records are
/// shared through `Arc` and never mutated, so later changes to the live state
/// cannot reach a stored snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlacementSnapshot {
    pub placed_tiles: Vec<PlacedTile>,
    pub next_position: Point,
    pub current_row: u32,
}

impl PlacementSnapshot {
    pub fn placed_ids(&self) -> impl Iterator<Item = &str> {
        self.placed_tiles.iter().map(|t| t.id.as_str())
    }
}
