//! # Tilekit
//!
//! Crop an image into a grid of tiles and reassemble them on an unbounded,
//! pannable and zoomable canvas, with snapping assistance and undo/redo.
//!
//! ## Architecture
//!
//! Tilekit is organized as a workspace with multiple crates:
//!
//! 1. **tilekit-core** - Geometry, screen/canvas coordinates, tile model, events
//! 2. **tilekit-viewport** - Pan, wheel and pinch zoom, crop box editing
//! 3. **tilekit-assembly** - Placement state, history, snapping, progress
//! 4. **tilekit-settings** - Configuration files and local persistence
//! 5. **tilekit** - This crate: logging setup and the script replay CLI

pub mod script;

pub use tilekit_assembly::{
    slice_tiles, AssemblySession, ExportedState, Hint, History, PlacementState,
    PlacementStatistics, PuzzleProgress, SessionStatistics, SnapOutcome, SnapResolver,
    ValidationReport,
};
pub use tilekit_core::{
    CoordinateSystem, CropSettings, EventBus, EventBusConfig, EventFilter, Point, PuzzleError,
    PuzzleEvent, PuzzleResult, Rect, Size, SnapConfig, Tile, TileSettings, Transform,
    ViewportLimits,
};
pub use tilekit_settings::{Config, SettingsError, SettingsStore};
pub use tilekit_viewport::{CropEditor, CropHandle, GestureState, ViewportController};

pub use script::{Action, PlacementRecord, Script, ScriptReport, ScriptRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Honors `RUST_LOG`, defaulting to `info`. Output goes to stderr so the
/// CLI's JSON report on stdout stays clean.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
