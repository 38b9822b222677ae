//! Shared default values.

/// Grid spacing used by grid snapping, in canvas units.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Maximum distance at which a candidate position is replaced by a target or
/// neighbor slot, in canvas units.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 20.0;

/// Maximum number of undo snapshots retained.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

pub const DEFAULT_MIN_SCALE: f64 = 0.1;
pub const DEFAULT_MAX_SCALE: f64 = 5.0;

/// Scale change per wheel notch.
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;

/// Minimum crop box edge, in screen pixels. Divided by the current scale to
/// get the canvas-space minimum.
pub const MIN_CROP_SCREEN_SIZE: f64 = 20.0;

/// Default tile edge length, in canvas units.
pub const DEFAULT_TILE_SIZE: f64 = 100.0;

/// Largest grid a crop may be sliced into. Larger requests produce no tiles.
pub const MAX_TILE_COUNT: u64 = 10_000;
