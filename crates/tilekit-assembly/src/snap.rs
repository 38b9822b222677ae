//! Drop-position snapping.
//!
//! A raw candidate position goes through three stages:
//!
//! 1. **Grid**: each coordinate rounds to the nearest multiple of
//!    `grid_size`.
//! 2. **Target**: if the tile's correct slot is within `snap_threshold` of
//!    the grid position, the result is exactly that slot.
//! 3. **Neighbor**: otherwise the closest slot adjacent to another placed
//!    tile wins, if any lies within `snap_threshold`.
//!
//! Distances are Euclidean in canvas units. The resolver keeps no state
//! between calls.

use serde::{Deserialize, Serialize};
use tilekit_core::geometry::{distance, snap_to_grid};
use tilekit_core::{PlacedTile, Point, SnapConfig, Tile};

/// Read access to placement data needed for snapping.
pub trait PlacementView {
    fn tile(&self, tile_id: &str) -> Option<&Tile>;

    /// Placed tiles in stable placement order.
    fn placed_tiles(&self) -> &[PlacedTile];

    /// Correct slot of a tile, if it has one.
    fn target_position(&self, tile_id: &str) -> Option<Point>;
}

/// Side of a placed tile that a snapped tile was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborSide {
    Left,
    Right,
    Top,
    Bottom,
}

/// Which stage decided the final position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapKind {
    /// Snapping disabled; raw position returned.
    None,
    Grid,
    Target,
    Neighbor { neighbor_id: String, side: NeighborSide },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapOutcome {
    pub position: Point,
    pub kind: SnapKind,
}

#[derive(Debug, Clone, Default)]
pub struct SnapResolver {
    config: SnapConfig,
}

impl SnapResolver {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SnapConfig) {
        self.config = config;
    }

    /// Final resting position for `tile_id` dropped at `raw`.
    pub fn resolve(&self, view: &impl PlacementView, tile_id: &str, raw: Point) -> Point {
        self.resolve_detailed(view, tile_id, raw).position
    }

    /// Like [`resolve`](Self::resolve), also reporting which stage won.
    pub fn resolve_detailed(
        &self,
        view: &impl PlacementView,
        tile_id: &str,
        raw: Point,
    ) -> SnapOutcome {
        if !self.config.enable_snapping {
            return SnapOutcome {
                position: raw,
                kind: SnapKind::None,
            };
        }

        let gridded = snap_to_grid(raw, self.config.grid_size);

        if let Some(target) = self.snap_to_target(view, tile_id, gridded) {
            return SnapOutcome {
                position: target,
                kind: SnapKind::Target,
            };
        }

        if let Some((position, neighbor_id, side)) = self.snap_to_neighbors(view, tile_id, gridded)
        {
            return SnapOutcome {
                position,
                kind: SnapKind::Neighbor { neighbor_id, side },
            };
        }

        SnapOutcome {
            position: gridded,
            kind: SnapKind::Grid,
        }
    }

    fn snap_to_target(
        &self,
        view: &impl PlacementView,
        tile_id: &str,
        position: Point,
    ) -> Option<Point> {
        let target = view.target_position(tile_id)?;
        (distance(position, target) <= self.config.snap_threshold).then_some(target)
    }

    /// Nearest adjacent slot within the threshold. Ties keep the first one
    /// found, scanning placed tiles in order and sides left, right, top,
    /// bottom. Slots are not checked for occupancy.
    fn snap_to_neighbors(
        &self,
        view: &impl PlacementView,
        tile_id: &str,
        position: Point,
    ) -> Option<(Point, String, NeighborSide)> {
        let moving = view.tile(tile_id)?;
        let mut best: Option<(Point, &str, NeighborSide)> = None;
        let mut best_distance = f64::INFINITY;

        for placed in view.placed_tiles().iter().filter(|p| p.id != tile_id) {
            for (slot, side) in adjacent_slots(placed, moving) {
                let d = distance(position, slot);
                if d <= self.config.snap_threshold && d < best_distance {
                    best_distance = d;
                    best = Some((slot, placed.id.as_str(), side));
                }
            }
        }

        best.map(|(slot, id, side)| (slot, id.to_string(), side))
    }
}

/// The four positions where `moving` would sit flush against `placed`.
fn adjacent_slots(placed: &PlacedTile, moving: &Tile) -> [(Point, NeighborSide); 4] {
    let Point { x, y } = placed.position;
    [
        (Point::new(x - moving.width, y), NeighborSide::Left),
        (Point::new(x + placed.width, y), NeighborSide::Right),
        (Point::new(x, y - moving.height), NeighborSide::Top),
        (Point::new(x, y + placed.height), NeighborSide::Bottom),
    ]
}
