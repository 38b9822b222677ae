//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.
//! Placement events carry the affected entity plus a full placement snapshot
//! so a UI can refresh without querying back.

use serde::{Deserialize, Serialize};

use crate::coordinates::Transform;
use crate::geometry::Point;
use crate::model::{CropSettings, GridLayout, PlacedTile, PlacementSnapshot};

/// Which history stack a restore came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreDirection {
    Undo,
    Redo,
}

impl std::fmt::Display for RestoreDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undo => write!(f, "undo"),
            Self::Redo => write!(f, "redo"),
        }
    }
}

/// Root event enum for everything the engine reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PuzzleEvent {
    /// Tiles were (re)loaded and the placement state recreated.
    PuzzleInitialized {
        tile_count: usize,
        layout: GridLayout,
    },
    /// A tile was placed or repositioned.
    TilePlaced {
        tile: PlacedTile,
        state: PlacementSnapshot,
    },
    /// A tile was taken off the canvas.
    TileRemoved {
        tile: PlacedTile,
        state: PlacementSnapshot,
    },
    /// Undo or redo replaced the placement state.
    StateRestored {
        direction: RestoreDirection,
        state: PlacementSnapshot,
    },
    /// All placements were cleared.
    PuzzleReset { state: PlacementSnapshot },
    /// The placement cursor moved to a new row.
    NextLineForced { next_position: Point, current_row: u32 },
    /// The crop region changed.
    CropSettingsChanged { crop: CropSettings },
    /// Pan or zoom changed the view transform.
    ViewportChanged { transform: Transform },
}

impl PuzzleEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            PuzzleEvent::PuzzleInitialized { .. } | PuzzleEvent::PuzzleReset { .. } => {
                EventCategory::Lifecycle
            }
            PuzzleEvent::TilePlaced { .. } | PuzzleEvent::TileRemoved { .. } => {
                EventCategory::Placement
            }
            PuzzleEvent::StateRestored { .. } => EventCategory::History,
            PuzzleEvent::NextLineForced { .. } => EventCategory::Layout,
            PuzzleEvent::CropSettingsChanged { .. } => EventCategory::Crop,
            PuzzleEvent::ViewportChanged { .. } => EventCategory::Viewport,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            PuzzleEvent::PuzzleInitialized { tile_count, layout } => format!(
                "Puzzle initialized: {} tiles in {}x{} grid",
                tile_count, layout.cols, layout.rows
            ),
            PuzzleEvent::TilePlaced { tile, .. } => {
                format!("Tile {} placed at {}", tile.id, tile.position)
            }
            PuzzleEvent::TileRemoved { tile, .. } => format!("Tile {} removed", tile.id),
            PuzzleEvent::StateRestored { direction, state } => format!(
                "State restored ({}): {} tiles placed",
                direction,
                state.placed_tiles.len()
            ),
            PuzzleEvent::PuzzleReset { .. } => "Puzzle reset".to_string(),
            PuzzleEvent::NextLineForced { current_row, .. } => {
                format!("Next line forced: row {}", current_row)
            }
            PuzzleEvent::CropSettingsChanged { crop } => format!(
                "Crop changed: ({:.1}, {:.1}) {:.1}x{:.1}",
                crop.x, crop.y, crop.width, crop.height
            ),
            PuzzleEvent::ViewportChanged { transform } => format!("Viewport: {}", transform),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Puzzle creation and reset.
    Lifecycle,
    /// Tiles placed or removed.
    Placement,
    /// Undo/redo restores.
    History,
    /// Placement cursor changes.
    Layout,
    /// Crop region edits.
    Crop,
    /// Pan/zoom changes.
    Viewport,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lifecycle => write!(f, "Lifecycle"),
            Self::Placement => write!(f, "Placement"),
            Self::History => write!(f, "History"),
            Self::Layout => write!(f, "Layout"),
            Self::Crop => write!(f, "Crop"),
            Self::Viewport => write!(f, "Viewport"),
        }
    }
}
