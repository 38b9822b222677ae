//! Session facade used by front ends.
//!
//! Combines the placement store with the snap resolver and guards every
//! mutation behind puzzle initialization. Calls made before
//! [`AssemblySession::initialize_puzzle`] are logged as `InvalidState` and
//! do nothing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tilekit_core::{
    CropSettings, EventBus, GridLayout, Point, PuzzleError, PuzzleResult, Size, SnapConfig, Tile,
    TileSettings,
};

use crate::placement::{ExportedState, PlacementState, PlacementStatistics};
use crate::progress::{self, Hint, PuzzleProgress, ValidationReport};
use crate::slicing::slice_tiles;
use crate::snap::{SnapOutcome, SnapResolver};

/// Everything a status panel shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub placement: PlacementStatistics,
    pub progress: PuzzleProgress,
    pub is_complete: bool,
    pub grid_layout: GridLayout,
}

#[derive(Debug, Clone)]
struct TileDrag {
    tile_id: String,
    /// Pointer position relative to the tile's top-left corner.
    grab_offset: Point,
}

#[derive(Debug)]
pub struct AssemblySession {
    placement: PlacementState,
    snapper: SnapResolver,
    initialized: bool,
    drag: Option<TileDrag>,
}

impl AssemblySession {
    pub fn new(snap: SnapConfig, history_depth: usize) -> Self {
        Self {
            placement: PlacementState::new(history_depth),
            snapper: SnapResolver::new(snap),
            initialized: false,
            drag: None,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.placement = self.placement.with_event_bus(bus);
        self
    }

    pub fn placement(&self) -> &PlacementState {
        &self.placement
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn snap_config(&self) -> &SnapConfig {
        self.snapper.config()
    }

    pub fn update_snap_config(&mut self, config: SnapConfig) -> PuzzleResult<()> {
        config.validate()?;
        self.snapper.set_config(config);
        tracing::debug!("Snap config updated: {:?}", config);
        Ok(())
    }

    pub fn set_crop_settings(&mut self, crop: CropSettings) -> bool {
        self.placement.set_crop_settings(crop)
    }

    pub fn set_tile_settings(&mut self, settings: TileSettings) -> bool {
        self.placement.set_tile_settings(settings)
    }

    // ---- lifecycle ------------------------------------------------------

    pub fn initialize_puzzle(&mut self, tiles: Vec<Tile>) -> GridLayout {
        self.drag = None;
        let layout = self.placement.load_tiles(tiles);
        self.initialized = true;
        layout
    }

    /// Slices the current crop with the current tile size and initializes
    /// the puzzle from the result. Returns the number of tiles.
    pub fn initialize_from_crop(&mut self) -> usize {
        let crop = self.placement.crop_settings();
        let tiles = slice_tiles(
            Size::new(crop.width, crop.height),
            &self.placement.tile_settings(),
        );
        let count = tiles.len();
        self.initialize_puzzle(tiles);
        count
    }

    pub fn export_state(&self) -> ExportedState {
        self.placement.export_state()
    }

    pub fn import_state(&mut self, exported: ExportedState) -> PuzzleResult<()> {
        self.placement.import_state(exported)?;
        self.drag = None;
        self.initialized = true;
        Ok(())
    }

    fn ensure_initialized(&self, operation: &str) -> bool {
        if self.initialized {
            return true;
        }
        let err = PuzzleError::InvalidState(format!("{} before puzzle initialization", operation));
        tracing::warn!("{}", err);
        false
    }

    // ---- placement ------------------------------------------------------

    /// Snaps `raw` and commits the result.
    pub fn drop_tile(&mut self, tile_id: &str, raw: Point) -> bool {
        if !self.ensure_initialized("drop_tile") {
            return false;
        }
        let outcome = self.snapper.resolve_detailed(&self.placement, tile_id, raw);
        tracing::debug!("Drop {} at {} -> {:?}", tile_id, raw, outcome.kind);
        self.placement.place_tile_at(tile_id, outcome.position)
    }

    pub fn place_tile_next(&mut self, tile_id: &str) -> bool {
        self.ensure_initialized("place_tile_next") && self.placement.place_tile_next(tile_id)
    }

    pub fn remove_tile(&mut self, tile_id: &str) -> bool {
        self.ensure_initialized("remove_tile") && self.placement.remove_tile(tile_id)
    }

    pub fn toggle_tile(&mut self, tile_id: &str) -> bool {
        self.ensure_initialized("toggle_tile") && self.placement.toggle_tile_placement(tile_id)
    }

    pub fn force_next_line(&mut self) -> bool {
        if !self.ensure_initialized("force_next_line") {
            return false;
        }
        self.placement.force_next_line();
        true
    }

    pub fn undo(&mut self) -> bool {
        self.ensure_initialized("undo") && self.placement.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.ensure_initialized("redo") && self.placement.redo()
    }

    pub fn reset(&mut self) -> bool {
        if !self.ensure_initialized("reset") {
            return false;
        }
        self.drag = None;
        self.placement.reset();
        true
    }

    /// Puts every unplaced tile whose slot is free onto its target. Each
    /// placement is a separate undo step. Returns how many were placed.
    pub fn auto_arrange(&mut self) -> usize {
        if !self.ensure_initialized("auto_arrange") {
            return 0;
        }
        let mut arranged = 0;
        for tile in self.placement.unplaced_tiles() {
            let Some(target) = self.placement.target_position(&tile.id) else {
                continue;
            };
            if self.placement.is_position_occupied(target, Some(&tile.id)) {
                continue;
            }
            if self.placement.place_tile_at(&tile.id, target) {
                arranged += 1;
            }
        }
        tracing::info!("Auto-arranged {} tiles", arranged);
        arranged
    }

    // ---- tile drag ------------------------------------------------------

    /// Starts dragging a tile with the pointer at a canvas point.
    ///
    /// For a placed tile the pointer keeps its offset from the tile's corner;
    /// an unplaced tile hangs from its top-left corner. Only one tile drag
    /// can be active.
    pub fn begin_tile_drag(&mut self, tile_id: &str, pointer: Point) -> bool {
        if !self.ensure_initialized("begin_tile_drag") {
            return false;
        }
        if let Some(active) = &self.drag {
            tracing::debug!("Drag of {} already active", active.tile_id);
            return false;
        }
        if self.placement.tile(tile_id).is_none() {
            tracing::warn!("{}", PuzzleError::not_found(tile_id));
            return false;
        }
        let grab_offset = self
            .placement
            .placed_tile(tile_id)
            .map(|p| pointer - p.position)
            .unwrap_or_default();
        self.drag = Some(TileDrag {
            tile_id: tile_id.to_string(),
            grab_offset,
        });
        true
    }

    /// Where the dragged tile would land if released now. Nothing is
    /// committed.
    pub fn update_tile_drag(&self, pointer: Point) -> Option<SnapOutcome> {
        let drag = self.drag.as_ref()?;
        Some(
            self.snapper
                .resolve_detailed(&self.placement, &drag.tile_id, pointer - drag.grab_offset),
        )
    }

    /// Releases the dragged tile and commits its snapped position.
    pub fn end_tile_drag(&mut self, pointer: Point) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.drop_tile(&drag.tile_id, pointer - drag.grab_offset)
    }

    pub fn cancel_tile_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            tracing::debug!("Drag of {} cancelled", drag.tile_id);
        }
    }

    pub fn dragging_tile(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.tile_id.as_str())
    }

    // ---- queries --------------------------------------------------------

    pub fn progress(&self) -> PuzzleProgress {
        PuzzleProgress::compute(&self.placement, self.snapper.config().snap_threshold)
    }

    pub fn is_complete(&self) -> bool {
        progress::is_complete(&self.placement, self.snapper.config().snap_threshold)
    }

    pub fn hint(&self, tile_id: &str) -> Option<Hint> {
        Hint::for_tile(&self.placement, tile_id, self.snapper.config().snap_threshold)
    }

    pub fn validate(&self) -> ValidationReport {
        ValidationReport::check(&self.placement, self.initialized)
    }

    pub fn statistics(&self) -> SessionStatistics {
        SessionStatistics {
            placement: self.placement.statistics(),
            progress: self.progress(),
            is_complete: self.is_complete(),
            grid_layout: self.placement.grid_layout(),
        }
    }
}

impl Default for AssemblySession {
    fn default() -> Self {
        Self::new(
            SnapConfig::default(),
            tilekit_core::constants::DEFAULT_HISTORY_DEPTH,
        )
    }
}
