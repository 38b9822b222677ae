//! Gesture state machine states.

use serde::{Deserialize, Serialize};
use tilekit_core::{CropSettings, Point, Transform};

use crate::crop::CropHandle;

/// Where a pinch began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchStart {
    /// Distance between the two touch points at gesture start.
    pub distance: f64,
    /// Scale at gesture start.
    pub scale: f64,
    /// Midpoint of the two touch points at gesture start.
    pub center: Point,
}

/// The single active gesture, if any.
///
/// Gestures are mutually exclusive: a pan cannot start while a pinch is
/// active and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Idle,
    Panning {
        /// Screen point where the drag started.
        start: Point,
        /// Transform at drag start.
        origin: Transform,
    },
    PinchZooming(PinchStart),
    Resizing {
        handle: CropHandle,
        start: Point,
        initial: CropSettings,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Panning { .. } => "panning",
            GestureState::PinchZooming(_) => "pinch-zooming",
            GestureState::Resizing { .. } => "resizing",
        }
    }
}

impl std::fmt::Display for GestureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GestureState::Resizing { handle, .. } => write!(f, "resizing({})", handle),
            other => write!(f, "{}", other.name()),
        }
    }
}
