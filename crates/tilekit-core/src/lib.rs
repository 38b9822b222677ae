//! # Tilekit Core
//!
//! Shared building blocks for Tilekit: 2D geometry, the screen ⇄ canvas
//! coordinate mapping, the tile data model, error types and the typed event
//! bus that connects the placement engine to the viewport.

pub mod config;
pub mod constants;
pub mod coordinates;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod model;

pub use config::{SnapConfig, ViewportLimits};

pub use coordinates::{CoordinateDebugInfo, CoordinateSystem, Transform};

pub use error::{PuzzleError, PuzzleResult};

pub use event_bus::{
    EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter, PuzzleEvent,
    RestoreDirection, SubscriptionId,
};

pub use geometry::{AffineMatrix, Point, Rect, Size};

pub use model::{
    CropSettings, GridLayout, GridPosition, PlacedTile, PlacementSnapshot, Tile, TileSettings,
};
