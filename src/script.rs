//! Replays a recorded assembly session.
//!
//! A script is a JSON document holding optional starting settings and a
//! list of actions, each tagged by `action`:
//!
//! ```json
//! {
//!   "crop": { "x": 0, "y": 0, "width": 300, "height": 300 },
//!   "actions": [
//!     { "action": "initialize" },
//!     { "action": "drop", "tile": "tile-4", "x": 105, "y": 95 },
//!     { "action": "wheel", "delta_y": -120, "x": 400, "y": 300 },
//!     { "action": "undo" }
//!   ]
//! }
//! ```
//!
//! Pointer positions are screen coordinates unless the action says canvas.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tilekit_assembly::{AssemblySession, SessionStatistics, ValidationReport};
use tilekit_core::{
    CropSettings, EventBus, EventBusConfig, Point, Size, SnapConfig, TileSettings, Transform,
};
use tilekit_settings::Config;
use tilekit_viewport::{CropHandle, ViewportController};

const DEFAULT_CONTAINER: Size = Size {
    width: 800.0,
    height: 600.0,
};

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SetCrop(CropSettings),
    SetTileSize(TileSettings),
    /// Slice the current crop and start a fresh puzzle.
    Initialize,
    /// Drop a tile at a canvas position.
    Drop { tile: String, x: f64, y: f64 },
    /// Drop a tile at a screen position.
    DropAtScreen { tile: String, x: f64, y: f64 },
    /// Pick a tile up at one screen point and release it at another.
    Drag { tile: String, from: Point, to: Point },
    PlaceNext { tile: String },
    Remove { tile: String },
    Toggle { tile: String },
    ForceNextLine,
    Undo,
    Redo,
    Reset,
    AutoArrange,
    SetSnapping { enabled: bool },
    Pan { dx: f64, dy: f64 },
    /// Mouse-drag pan between two screen points.
    DragPan { from: Point, to: Point },
    Wheel { delta_y: f64, x: f64, y: f64 },
    ZoomIn,
    ZoomOut,
    /// Anchor is a fraction of the container; the centre when omitted.
    SetScale {
        scale: f64,
        #[serde(default)]
        anchor: Option<Point>,
    },
    ResetView,
    Pinch { from: [Point; 2], to: [Point; 2] },
    EditCrop {
        handle: CropHandle,
        from: Point,
        to: Point,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Viewport size in screen pixels.
    pub container: Option<Size>,
    /// Source image size; bounds crop editing when present.
    pub image: Option<Size>,
    pub crop: Option<CropSettings>,
    pub tiles: Option<TileSettings>,
    pub snap: Option<SnapConfig>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub transform: Transform,
    pub crop: CropSettings,
    pub tile_settings: TileSettings,
    pub placements: Vec<PlacementRecord>,
    pub statistics: SessionStatistics,
    pub validation: ValidationReport,
    /// Indices of actions the engine refused.
    pub rejected: Vec<usize>,
    /// Script-level settings (`snap`, `tiles`, `crop`) that failed
    /// validation; the configured values stayed in effect.
    pub rejected_settings: Vec<String>,
    /// Descriptions of the events published during the replay.
    pub events: Vec<String>,
}

pub struct ScriptRunner {
    session: AssemblySession,
    viewport: ViewportController,
    bus: Arc<EventBus>,
    crop: CropSettings,
    tiles: TileSettings,
}

impl ScriptRunner {
    pub fn new(config: &Config) -> Self {
        let bus = Arc::new(EventBus::with_config(EventBusConfig {
            log_capacity: Some(10_000),
            ..Default::default()
        }));
        let session =
            AssemblySession::new(config.snap, config.history.max_depth).with_event_bus(bus.clone());
        let viewport =
            ViewportController::new(DEFAULT_CONTAINER, config.viewport).with_event_bus(bus.clone());
        Self {
            session,
            viewport,
            bus,
            crop: config.crop,
            tiles: config.tiles,
        }
    }

    pub fn session(&self) -> &AssemblySession {
        &self.session
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn run(mut self, script: &Script) -> ScriptReport {
        if let Some(size) = script.container {
            self.viewport.resize_container(size);
        }
        self.viewport.set_image_size(script.image);
        self.session.set_tile_settings(self.tiles);
        self.session.set_crop_settings(self.crop);

        let mut rejected_settings = Vec::new();
        if let Some(snap) = script.snap {
            if let Err(e) = self.session.update_snap_config(snap) {
                tracing::warn!("Ignoring script snap settings: {}", e);
                rejected_settings.push("snap".to_string());
            }
        }
        if let Some(tiles) = script.tiles {
            if !self.session.set_tile_settings(tiles) {
                rejected_settings.push("tiles".to_string());
            }
        }
        if let Some(crop) = script.crop {
            if !self.session.set_crop_settings(crop) {
                rejected_settings.push("crop".to_string());
            }
        }

        let mut rejected = Vec::new();
        for (index, action) in script.actions.iter().enumerate() {
            if !self.apply(action) {
                tracing::debug!("Action {} rejected: {:?}", index, action);
                rejected.push(index);
            }
        }
        tracing::info!(
            "Replayed {} actions, {} rejected",
            script.actions.len(),
            rejected.len()
        );
        self.report(rejected, rejected_settings)
    }

    fn apply(&mut self, action: &Action) -> bool {
        match action {
            Action::SetCrop(crop) => self.session.set_crop_settings(*crop),
            Action::SetTileSize(tiles) => self.session.set_tile_settings(*tiles),
            Action::Initialize => self.session.initialize_from_crop() > 0,
            Action::Drop { tile, x, y } => self.session.drop_tile(tile, Point::new(*x, *y)),
            Action::DropAtScreen { tile, x, y } => {
                let canvas = self.to_canvas(Point::new(*x, *y));
                self.session.drop_tile(tile, canvas)
            }
            Action::Drag { tile, from, to } => {
                let from = self.to_canvas(*from);
                let to = self.to_canvas(*to);
                self.session.begin_tile_drag(tile, from) && self.session.end_tile_drag(to)
            }
            Action::PlaceNext { tile } => self.session.place_tile_next(tile),
            Action::Remove { tile } => self.session.remove_tile(tile),
            Action::Toggle { tile } => self.session.toggle_tile(tile),
            Action::ForceNextLine => self.session.force_next_line(),
            Action::Undo => self.session.undo(),
            Action::Redo => self.session.redo(),
            Action::Reset => self.session.reset(),
            Action::AutoArrange => self.session.auto_arrange() > 0,
            Action::SetSnapping { enabled } => {
                let config = SnapConfig {
                    enable_snapping: *enabled,
                    ..*self.session.snap_config()
                };
                self.session.update_snap_config(config).is_ok()
            }
            Action::Pan { dx, dy } => {
                self.viewport.pan_by(*dx, *dy);
                true
            }
            Action::DragPan { from, to } => {
                let moved =
                    self.viewport.start_pan(from.x, from.y) && self.viewport.update_pan(to.x, to.y);
                self.viewport.end_pan();
                moved
            }
            Action::Wheel { delta_y, x, y } => {
                self.viewport.wheel(*delta_y, Point::new(*x, *y));
                true
            }
            Action::ZoomIn => {
                self.viewport.zoom_in();
                true
            }
            Action::ZoomOut => {
                self.viewport.zoom_out();
                true
            }
            Action::SetScale { scale, anchor } => {
                let anchor = anchor.unwrap_or(Point::new(0.5, 0.5));
                self.viewport.set_scale(*scale, anchor);
                true
            }
            Action::ResetView => {
                self.viewport.reset_transform();
                true
            }
            Action::Pinch { from, to } => {
                let pinched = self.viewport.start_pinch(from[0], from[1])
                    && self.viewport.update_pinch(to[0], to[1]);
                self.viewport.end_pinch();
                pinched
            }
            Action::EditCrop { handle, from, to } => {
                let crop = self.session.placement().crop_settings();
                if !self.viewport.begin_crop_edit(*handle, from.x, from.y, crop) {
                    return false;
                }
                let edited = self.viewport.update_crop_edit(to.x, to.y);
                self.viewport.end_crop_edit();
                edited.is_some_and(|crop| self.session.set_crop_settings(crop))
            }
        }
    }

    fn to_canvas(&self, screen: Point) -> Point {
        self.viewport.coordinates().screen_to_canvas(screen)
    }

    fn report(self, rejected: Vec<usize>, rejected_settings: Vec<String>) -> ScriptReport {
        let placement = self.session.placement();
        let placements = placement
            .placed_tiles()
            .iter()
            .map(|p| PlacementRecord {
                id: p.id.clone(),
                x: p.position.x,
                y: p.position.y,
            })
            .collect();
        ScriptReport {
            transform: self.viewport.transform(),
            crop: placement.crop_settings(),
            tile_settings: placement.tile_settings(),
            placements,
            statistics: self.session.statistics(),
            validation: self.session.validate(),
            rejected,
            rejected_settings,
            events: self
                .bus
                .event_log()
                .iter()
                .map(|e| e.description())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_parse_from_tagged_json() {
        let json = r#"[
            { "action": "set_crop", "x": 0, "y": 0, "width": 200, "height": 100 },
            { "action": "drop", "tile": "tile-1", "x": 104.5, "y": -3 },
            { "action": "set_scale", "scale": 2 },
            { "action": "edit_crop", "handle": "se", "from": { "x": 1, "y": 2 }, "to": { "x": 3, "y": 4 } },
            { "action": "undo" }
        ]"#;
        let actions: Vec<Action> = serde_json::from_str(json).unwrap();
        assert_eq!(
            actions[0],
            Action::SetCrop(CropSettings::new(0.0, 0.0, 200.0, 100.0))
        );
        assert_eq!(
            actions[2],
            Action::SetScale {
                scale: 2.0,
                anchor: None
            }
        );
        assert!(matches!(
            actions[3],
            Action::EditCrop {
                handle: CropHandle::SE,
                ..
            }
        ));
        assert_eq!(actions[4], Action::Undo);
    }

    #[test]
    fn test_empty_script_uses_config() {
        let mut config = Config::default();
        config.crop = CropSettings::new(0.0, 0.0, 300.0, 200.0);
        let report = ScriptRunner::new(&config).run(&Script::default());
        assert_eq!(report.crop, config.crop);
        assert!(report.placements.is_empty());
        assert!(!report.validation.is_valid());
        assert_eq!(report.transform, Transform::identity());
    }
}
