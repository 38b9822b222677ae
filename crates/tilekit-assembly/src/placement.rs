//! Placement store with transactional undo/redo.
//!
//! [`PlacementState`] is the single writer of which tiles sit where. Every
//! content mutation records a [`PlacementSnapshot`] first and either applies
//! completely or is rejected without touching state or history. Failures are
//! expected during normal interaction, so mutators return `bool` and log the
//! reason instead of returning errors.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tilekit_core::geometry::get_bounding_rect;
use tilekit_core::{
    CropSettings, EventBus, GridLayout, PlacedTile, PlacementSnapshot, Point, PuzzleError,
    PuzzleEvent, PuzzleResult, Rect, RestoreDirection, Tile, TileSettings,
};

use crate::history::History;
use crate::snap::PlacementView;

/// Version tag written by [`PlacementState::export_state`].
pub const EXPORT_VERSION: &str = "1.0.0";

/// Tiles, placements, layout and the placement cursor.
#[derive(Debug, Clone, Default)]
pub struct PuzzleState {
    tiles: Vec<Arc<Tile>>,
    placed_tiles: Vec<PlacedTile>,
    next_position: Point,
    current_row: u32,
    tiles_per_row: u32,
    grid_layout: GridLayout,
    target_positions: HashMap<String, Point>,
    crop_settings: CropSettings,
    tile_settings: TileSettings,
}

impl PuzzleState {
    fn snapshot(&self) -> PlacementSnapshot {
        PlacementSnapshot {
            placed_tiles: self.placed_tiles.clone(),
            next_position: self.next_position,
            current_row: self.current_row,
        }
    }

    fn restore(&mut self, snapshot: PlacementSnapshot) {
        self.placed_tiles = snapshot.placed_tiles;
        self.next_position = snapshot.next_position;
        self.current_row = snapshot.current_row;
    }

    fn reset_cursor(&mut self) {
        self.next_position = Point::origin();
        self.current_row = 0;
    }

    /// Moves the cursor one tile to the right, wrapping to the next row when
    /// another tile would no longer fit inside the crop width.
    fn advance_cursor(&mut self) {
        let TileSettings { width, height } = self.tile_settings;
        self.next_position.x += width;
        if self.next_position.x + width > self.crop_settings.width {
            self.next_position.x = 0.0;
            self.current_row += 1;
            self.next_position.y = f64::from(self.current_row) * height;
        }
    }

    /// Recomputes everything derived from tiles, crop and tile size.
    fn recompute_layout(&mut self) {
        self.grid_layout = GridLayout::compute(&self.crop_settings, &self.tile_settings);
        self.tiles_per_row = if self.tile_settings.width > 0.0 {
            (self.crop_settings.width / self.tile_settings.width)
                .floor()
                .max(0.0) as u32
        } else {
            0
        };
        let layout = self.grid_layout;
        self.target_positions = self
            .tiles
            .iter()
            .map(|t| (t.id.clone(), layout.cell_origin(t.grid_position)))
            .collect();
    }

    fn placed_index(&self, tile_id: &str) -> Option<usize> {
        self.placed_tiles.iter().position(|p| p.id == tile_id)
    }
}

/// Counts for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementStatistics {
    pub total_tiles: usize,
    pub placed_tiles: usize,
    pub unplaced_tiles: usize,
    /// Placed share of all tiles, rounded to a whole percent.
    pub completion_percentage: u32,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

/// One placement in an exported state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedPlacement {
    pub tile_id: String,
    pub position: Point,
}

/// Serializable copy of the whole puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedState {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub crop_settings: CropSettings,
    pub tile_settings: TileSettings,
    pub tiles: Vec<Tile>,
    pub placements: Vec<ExportedPlacement>,
    pub next_position: Point,
    pub current_row: u32,
}

pub struct PlacementState {
    state: PuzzleState,
    history: History<PlacementSnapshot>,
    bus: Option<Arc<EventBus>>,
    dirty: bool,
}

impl PlacementState {
    pub fn new(history_depth: usize) -> Self {
        Self {
            state: PuzzleState::default(),
            history: History::with_depth(history_depth),
            bus: None,
            dirty: false,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    // ---- configuration ------------------------------------------------

    pub fn crop_settings(&self) -> CropSettings {
        self.state.crop_settings
    }

    /// Sets the crop region. Layout and target slots are recomputed; existing
    /// placements are left alone.
    pub fn set_crop_settings(&mut self, crop: CropSettings) -> bool {
        if !(crop.width > 0.0 && crop.height > 0.0) {
            self.reject(PuzzleError::out_of_range(
                "crop",
                format!("{}x{}", crop.width, crop.height),
            ));
            return false;
        }
        self.state.crop_settings = crop;
        self.state.recompute_layout();
        self.dirty = true;
        self.emit(PuzzleEvent::CropSettingsChanged { crop });
        true
    }

    pub fn tile_settings(&self) -> TileSettings {
        self.state.tile_settings
    }

    pub fn set_tile_settings(&mut self, settings: TileSettings) -> bool {
        if !(settings.width > 0.0 && settings.height > 0.0) {
            self.reject(PuzzleError::out_of_range(
                "tile size",
                format!("{}x{}", settings.width, settings.height),
            ));
            return false;
        }
        self.state.tile_settings = settings;
        self.state.recompute_layout();
        self.dirty = true;
        true
    }

    pub fn history_depth(&self) -> usize {
        self.history.max_depth()
    }

    pub fn set_history_depth(&mut self, depth: usize) {
        self.history.set_max_depth(depth);
    }

    // ---- tiles ----------------------------------------------------------

    /// Replaces the tile set.
    ///
    /// All placements, the cursor and the undo/redo history are cleared,
    /// since old snapshots may reference tiles that no longer exist. Tiles
    /// with a duplicate id are dropped.
    pub fn load_tiles(&mut self, tiles: Vec<Tile>) -> GridLayout {
        let mut seen = HashSet::new();
        let mut loaded = Vec::with_capacity(tiles.len());
        for tile in tiles {
            if seen.insert(tile.id.clone()) {
                loaded.push(Arc::new(tile));
            } else {
                tracing::warn!("Dropping tile with duplicate id {}", tile.id);
            }
        }

        self.state.tiles = loaded;
        self.state.placed_tiles.clear();
        self.state.reset_cursor();
        self.state.recompute_layout();
        self.history.clear();
        self.dirty = true;

        let layout = self.state.grid_layout;
        tracing::info!(
            "Loaded {} tiles ({}x{} grid, {} per row)",
            self.state.tiles.len(),
            layout.cols,
            layout.rows,
            self.state.tiles_per_row
        );
        self.emit(PuzzleEvent::PuzzleInitialized {
            tile_count: self.state.tiles.len(),
            layout,
        });
        layout
    }

    pub fn tiles(&self) -> &[Arc<Tile>] {
        &self.state.tiles
    }

    pub fn tile(&self, tile_id: &str) -> Option<&Arc<Tile>> {
        self.state.tiles.iter().find(|t| t.id == tile_id)
    }

    fn lookup(&self, tile_id: &str) -> PuzzleResult<Arc<Tile>> {
        self.tile(tile_id)
            .cloned()
            .ok_or_else(|| PuzzleError::not_found(tile_id))
    }

    pub fn placed_tiles(&self) -> &[PlacedTile] {
        &self.state.placed_tiles
    }

    pub fn placed_tile(&self, tile_id: &str) -> Option<&PlacedTile> {
        self.state.placed_tiles.iter().find(|p| p.id == tile_id)
    }

    pub fn is_placed(&self, tile_id: &str) -> bool {
        self.state.placed_index(tile_id).is_some()
    }

    /// Tiles without a placement, in tile order.
    pub fn unplaced_tiles(&self) -> Vec<Arc<Tile>> {
        let placed: HashSet<&str> = self
            .state
            .placed_tiles
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        self.state
            .tiles
            .iter()
            .filter(|t| !placed.contains(t.id.as_str()))
            .cloned()
            .collect()
    }

    pub fn next_position(&self) -> Point {
        self.state.next_position
    }

    pub fn current_row(&self) -> u32 {
        self.state.current_row
    }

    pub fn tiles_per_row(&self) -> u32 {
        self.state.tiles_per_row
    }

    pub fn grid_layout(&self) -> GridLayout {
        self.state.grid_layout
    }

    pub fn target_position(&self, tile_id: &str) -> Option<Point> {
        self.state.target_positions.get(tile_id).copied()
    }

    pub fn puzzle_state(&self) -> &PuzzleState {
        &self.state
    }

    /// Copy of the undoable part of the state.
    pub fn snapshot(&self) -> PlacementSnapshot {
        self.state.snapshot()
    }

    // ---- placement ------------------------------------------------------

    /// Places `tile_id` at `position`, or moves it there if already placed.
    ///
    /// A moved tile keeps its slot in placement order. Overlap is allowed.
    pub fn place_tile_at(&mut self, tile_id: &str, position: Point) -> bool {
        let tile = match self.lookup(tile_id) {
            Ok(tile) => tile,
            Err(e) => return self.reject(e),
        };
        if !position.is_finite() {
            return self.reject(PuzzleError::out_of_range("position", position));
        }

        self.record();
        let placed = PlacedTile::new(tile, position);
        match self.state.placed_index(tile_id) {
            Some(index) => self.state.placed_tiles[index] = placed.clone(),
            None => self.state.placed_tiles.push(placed.clone()),
        }
        self.dirty = true;

        tracing::debug!("Placed {} at {}", tile_id, position);
        self.emit(PuzzleEvent::TilePlaced {
            tile: placed,
            state: self.snapshot(),
        });
        true
    }

    /// Places an unplaced tile at the cursor and advances it.
    ///
    /// Unknown or already placed tiles are a no-op returning `false`.
    pub fn place_tile_next(&mut self, tile_id: &str) -> bool {
        let tile = match self.lookup(tile_id) {
            Ok(tile) => tile,
            Err(e) => return self.reject(e),
        };
        if self.is_placed(tile_id) {
            tracing::debug!("{} is already placed", tile_id);
            return false;
        }

        self.record();
        let placed = PlacedTile::new(tile, self.state.next_position);
        self.state.placed_tiles.push(placed.clone());
        self.state.advance_cursor();
        self.dirty = true;

        tracing::debug!(
            "Placed {} at {}, next {}",
            tile_id,
            placed.position,
            self.state.next_position
        );
        self.emit(PuzzleEvent::TilePlaced {
            tile: placed,
            state: self.snapshot(),
        });
        true
    }

    /// Removes a placement. A tile that is not placed leaves state and
    /// history untouched.
    pub fn remove_tile(&mut self, tile_id: &str) -> bool {
        let Some(index) = self.state.placed_index(tile_id) else {
            return self.reject(PuzzleError::not_found(tile_id));
        };

        self.record();
        let removed = self.state.placed_tiles.remove(index);
        self.dirty = true;

        tracing::debug!("Removed {}", tile_id);
        self.emit(PuzzleEvent::TileRemoved {
            tile: removed,
            state: self.snapshot(),
        });
        true
    }

    /// Removes the tile if placed, otherwise places it at the cursor.
    pub fn toggle_tile_placement(&mut self, tile_id: &str) -> bool {
        if self.is_placed(tile_id) {
            self.remove_tile(tile_id)
        } else {
            self.place_tile_next(tile_id)
        }
    }

    /// Starts a new cursor row. Not recorded in history.
    pub fn force_next_line(&mut self) {
        self.state.current_row += 1;
        self.state.next_position = Point::new(
            0.0,
            f64::from(self.state.current_row) * self.state.tile_settings.height,
        );
        tracing::debug!("Next line forced: row {}", self.state.current_row);
        self.emit(PuzzleEvent::NextLineForced {
            next_position: self.state.next_position,
            current_row: self.state.current_row,
        });
    }

    /// Clears all placements and the cursor. Recorded, so it can be undone.
    pub fn reset(&mut self) {
        self.record();
        self.state.placed_tiles.clear();
        self.state.reset_cursor();
        self.dirty = true;
        tracing::debug!("Placements reset");
        self.emit(PuzzleEvent::PuzzleReset {
            state: self.snapshot(),
        });
    }

    // ---- history --------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let current = self.state.snapshot();
        let Some(previous) = self.history.undo(current) else {
            return false;
        };
        self.restore(previous, RestoreDirection::Undo);
        true
    }

    pub fn redo(&mut self) -> bool {
        let current = self.state.snapshot();
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        self.restore(next, RestoreDirection::Redo);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_count()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_count()
    }

    fn record(&mut self) {
        self.history.record(self.state.snapshot());
    }

    fn restore(&mut self, snapshot: PlacementSnapshot, direction: RestoreDirection) {
        self.state.restore(snapshot);
        self.dirty = true;
        tracing::debug!(
            "State restored ({}): {} placed",
            direction,
            self.state.placed_tiles.len()
        );
        self.emit(PuzzleEvent::StateRestored {
            direction,
            state: self.snapshot(),
        });
    }

    // ---- queries --------------------------------------------------------

    /// Whether any placed tile other than `exclude` would overlap a tile of
    /// its own size sitting at `position`.
    pub fn is_position_occupied(&self, position: Point, exclude: Option<&str>) -> bool {
        self.state
            .placed_tiles
            .iter()
            .filter(|p| Some(p.id.as_str()) != exclude)
            .any(|p| p.rect_at(position).overlaps(&p.rect()))
    }

    /// Bounding box of all placed tiles, `None` when nothing is placed.
    pub fn assembly_bounds(&self) -> Option<Rect> {
        let rects: Vec<Rect> = self.state.placed_tiles.iter().map(|p| p.rect()).collect();
        get_bounding_rect(&rects)
    }

    pub fn can_export(&self) -> bool {
        !self.state.placed_tiles.is_empty()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn statistics(&self) -> PlacementStatistics {
        let total = self.state.tiles.len();
        let placed = self.state.placed_tiles.len();
        PlacementStatistics {
            total_tiles: total,
            placed_tiles: placed,
            unplaced_tiles: total.saturating_sub(placed),
            completion_percentage: percentage(placed, total),
            undo_depth: self.history.undo_count(),
            redo_depth: self.history.redo_count(),
        }
    }

    // ---- import / export ------------------------------------------------

    pub fn export_state(&self) -> ExportedState {
        ExportedState {
            version: EXPORT_VERSION.to_string(),
            timestamp: Utc::now(),
            crop_settings: self.state.crop_settings,
            tile_settings: self.state.tile_settings,
            tiles: self.state.tiles.iter().map(|t| Tile::clone(t)).collect(),
            placements: self
                .state
                .placed_tiles
                .iter()
                .map(|p| ExportedPlacement {
                    tile_id: p.id.clone(),
                    position: p.position,
                })
                .collect(),
            next_position: self.state.next_position,
            current_row: self.state.current_row,
        }
    }

    /// Replaces the whole puzzle with an exported one.
    ///
    /// The import is checked completely before anything changes. Like
    /// [`load_tiles`](Self::load_tiles) it clears the history.
    pub fn import_state(&mut self, exported: ExportedState) -> PuzzleResult<()> {
        if exported.version != EXPORT_VERSION {
            return Err(PuzzleError::InvalidState(format!(
                "unsupported export version {}",
                exported.version
            )));
        }
        if !(exported.tile_settings.width > 0.0 && exported.tile_settings.height > 0.0) {
            return Err(PuzzleError::out_of_range(
                "tile size",
                format!(
                    "{}x{}",
                    exported.tile_settings.width, exported.tile_settings.height
                ),
            ));
        }

        let crop = exported.crop_settings;
        if !(crop.width > 0.0 && crop.height > 0.0) {
            return Err(PuzzleError::out_of_range(
                "crop",
                format!("{}x{}", crop.width, crop.height),
            ));
        }

        let usable = |v: f64| v.is_finite() && v > 0.0;
        if let Some(bad) = exported
            .tiles
            .iter()
            .find(|t| !(usable(t.width) && usable(t.height)))
        {
            return Err(PuzzleError::out_of_range(
                format!("{} size", bad.id),
                format!("{}x{}", bad.width, bad.height),
            ));
        }
        if !exported.next_position.is_finite() {
            return Err(PuzzleError::out_of_range(
                "next_position",
                exported.next_position,
            ));
        }

        let tiles: Vec<Arc<Tile>> = exported.tiles.into_iter().map(Arc::new).collect();
        let by_id: HashMap<&str, &Arc<Tile>> =
            tiles.iter().map(|t| (t.id.as_str(), t)).collect();
        if by_id.len() != tiles.len() {
            return Err(PuzzleError::InvalidState(
                "duplicate tile ids in import".to_string(),
            ));
        }

        let mut placed = Vec::with_capacity(exported.placements.len());
        let mut placed_ids = HashSet::new();
        for p in &exported.placements {
            let tile = by_id
                .get(p.tile_id.as_str())
                .ok_or_else(|| PuzzleError::not_found(&p.tile_id))?;
            if !(p.position.x.is_finite() && p.position.y.is_finite()) {
                return Err(PuzzleError::out_of_range("position", p.position));
            }
            if !placed_ids.insert(p.tile_id.as_str()) {
                return Err(PuzzleError::InvalidState(format!(
                    "tile {} placed twice in import",
                    p.tile_id
                )));
            }
            placed.push(PlacedTile::new(Arc::clone(tile), p.position));
        }

        self.state = PuzzleState {
            tiles,
            placed_tiles: placed,
            next_position: exported.next_position,
            current_row: exported.current_row,
            crop_settings: exported.crop_settings,
            tile_settings: exported.tile_settings,
            ..PuzzleState::default()
        };
        self.state.recompute_layout();
        self.history.clear();
        self.dirty = true;

        tracing::info!(
            "Imported puzzle: {} tiles, {} placed",
            self.state.tiles.len(),
            self.state.placed_tiles.len()
        );
        self.emit(PuzzleEvent::PuzzleInitialized {
            tile_count: self.state.tiles.len(),
            layout: self.state.grid_layout,
        });
        Ok(())
    }

    // ---- plumbing -------------------------------------------------------

    fn reject(&self, error: PuzzleError) -> bool {
        tracing::warn!("Placement rejected: {}", error);
        false
    }

    fn emit(&self, event: PuzzleEvent) {
        if let Some(bus) = &self.bus {
            bus.emit(event);
        }
    }
}

impl Default for PlacementState {
    fn default() -> Self {
        Self::new(tilekit_core::constants::DEFAULT_HISTORY_DEPTH)
    }
}

impl std::fmt::Debug for PlacementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementState")
            .field("tiles", &self.state.tiles.len())
            .field("placed", &self.state.placed_tiles.len())
            .field("next_position", &self.state.next_position)
            .field("undo_depth", &self.history.undo_count())
            .field("redo_depth", &self.history.redo_count())
            .finish()
    }
}

impl PlacementView for PlacementState {
    fn tile(&self, tile_id: &str) -> Option<&Tile> {
        PlacementState::tile(self, tile_id).map(|t| t.as_ref())
    }

    fn placed_tiles(&self) -> &[PlacedTile] {
        &self.state.placed_tiles
    }

    fn target_position(&self, tile_id: &str) -> Option<Point> {
        PlacementState::target_position(self, tile_id)
    }
}

pub(crate) fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}
