//! Tunable parameters shared between the engine crates and the settings
//! store.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GRID_SIZE, DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_SNAP_THRESHOLD,
    DEFAULT_ZOOM_STEP,
};
use crate::error::{PuzzleError, PuzzleResult};

/// Snapping behaviour for tile drops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enable_snapping: bool,
    pub grid_size: f64,
    pub snap_threshold: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enable_snapping: true,
            grid_size: DEFAULT_GRID_SIZE,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl SnapConfig {
    pub fn validate(&self) -> PuzzleResult<()> {
        if !(self.grid_size > 0.0 && self.grid_size.is_finite()) {
            return Err(PuzzleError::out_of_range("grid_size", self.grid_size));
        }
        if !(self.snap_threshold >= 0.0 && self.snap_threshold.is_finite()) {
            return Err(PuzzleError::out_of_range(
                "snap_threshold",
                self.snap_threshold,
            ));
        }
        Ok(())
    }
}

/// Zoom bounds and wheel step for the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_step: f64,
}

impl Default for ViewportLimits {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            zoom_step: DEFAULT_ZOOM_STEP,
        }
    }
}

impl ViewportLimits {
    pub fn validate(&self) -> PuzzleResult<()> {
        if !(self.min_scale > 0.0 && self.min_scale.is_finite()) {
            return Err(PuzzleError::out_of_range("min_scale", self.min_scale));
        }
        if !(self.max_scale >= self.min_scale && self.max_scale.is_finite()) {
            return Err(PuzzleError::out_of_range("max_scale", self.max_scale));
        }
        if !(self.zoom_step > 0.0 && self.zoom_step.is_finite()) {
            return Err(PuzzleError::out_of_range("zoom_step", self.zoom_step));
        }
        Ok(())
    }

    /// Clamps a requested scale into `[min_scale, max_scale]`.
    ///
    /// Zero, negative and NaN requests resolve to `min_scale`, so the result is
    /// always a usable scale. Never panics, even on limits that fail
    /// [`validate`](Self::validate); `max_scale` wins when the bounds cross.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() || scale <= 0.0 {
            return self.min_scale;
        }
        scale.max(self.min_scale).min(self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SnapConfig::default().validate().is_ok());
        assert!(ViewportLimits::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_limits() {
        let limits = ViewportLimits {
            min_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            limits.validate(),
            Err(PuzzleError::OutOfRange { .. })
        ));

        let limits = ViewportLimits {
            min_scale: 3.0,
            max_scale: 2.0,
            ..Default::default()
        };
        assert!(limits.validate().is_err());

        let snap = SnapConfig {
            grid_size: -1.0,
            ..Default::default()
        };
        assert!(snap.validate().is_err());
    }

    #[test]
    fn test_clamp_scale() {
        let limits = ViewportLimits::default();
        assert_eq!(limits.clamp_scale(0.0), 0.1);
        assert_eq!(limits.clamp_scale(-3.0), 0.1);
        assert_eq!(limits.clamp_scale(f64::NAN), 0.1);
        assert_eq!(limits.clamp_scale(99.0), 5.0);
        assert_eq!(limits.clamp_scale(f64::INFINITY), 5.0);
        assert_eq!(limits.clamp_scale(1.5), 1.5);
    }

    #[test]
    fn test_clamp_scale_with_crossed_limits() {
        let limits = ViewportLimits {
            min_scale: 3.0,
            max_scale: 2.0,
            ..Default::default()
        };
        assert_eq!(limits.clamp_scale(1.0), 2.0);
        assert_eq!(limits.clamp_scale(10.0), 2.0);

        let limits = ViewportLimits {
            max_scale: f64::NAN,
            ..Default::default()
        };
        assert_eq!(limits.clamp_scale(2.0), 2.0);
    }
}
