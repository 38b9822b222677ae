//! Crop box editing.
//!
//! All math is in canvas units. Screen deltas are divided by the current
//! scale before they get here.

use serde::{Deserialize, Serialize};
use tilekit_core::constants::MIN_CROP_SCREEN_SIZE;
use tilekit_core::{CropSettings, Size};

/// Part of the crop box being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropHandle {
    /// The box interior: moves without resizing.
    Body,
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl CropHandle {
    pub const ALL: [CropHandle; 9] = [
        CropHandle::Body,
        CropHandle::N,
        CropHandle::S,
        CropHandle::E,
        CropHandle::W,
        CropHandle::NE,
        CropHandle::NW,
        CropHandle::SE,
        CropHandle::SW,
    ];

    /// Looks up a handle by its short name (`"nw"`, `"e"`, `"body"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CropHandle::Body => "body",
            CropHandle::N => "n",
            CropHandle::S => "s",
            CropHandle::E => "e",
            CropHandle::W => "w",
            CropHandle::NE => "ne",
            CropHandle::NW => "nw",
            CropHandle::SE => "se",
            CropHandle::SW => "sw",
        }
    }

    fn moves_left_edge(&self) -> bool {
        matches!(self, CropHandle::W | CropHandle::NW | CropHandle::SW)
    }

    fn moves_right_edge(&self) -> bool {
        matches!(self, CropHandle::E | CropHandle::NE | CropHandle::SE)
    }

    fn moves_top_edge(&self) -> bool {
        matches!(self, CropHandle::N | CropHandle::NE | CropHandle::NW)
    }

    fn moves_bottom_edge(&self) -> bool {
        matches!(self, CropHandle::S | CropHandle::SE | CropHandle::SW)
    }
}

impl std::fmt::Display for CropHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies crop drags and keeps the result legal.
#[derive(Debug, Clone, Default)]
pub struct CropEditor {
    image_size: Option<Size>,
}

impl CropEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds used for clamping. Without an image the crop is only held to
    /// its minimum size.
    pub fn set_image_size(&mut self, size: Option<Size>) {
        self.image_size = size;
    }

    pub fn image_size(&self) -> Option<Size> {
        self.image_size
    }

    /// Result of dragging `handle` by a canvas-space delta from `initial`.
    pub fn apply(
        &self,
        handle: CropHandle,
        initial: &CropSettings,
        dx: f64,
        dy: f64,
        scale: f64,
    ) -> CropSettings {
        let mut crop = *initial;

        if handle == CropHandle::Body {
            crop.x += dx;
            crop.y += dy;
        } else {
            if handle.moves_left_edge() {
                crop.x += dx;
                crop.width -= dx;
            }
            if handle.moves_right_edge() {
                crop.width += dx;
            }
            if handle.moves_top_edge() {
                crop.y += dy;
                crop.height -= dy;
            }
            if handle.moves_bottom_edge() {
                crop.height += dy;
            }
        }

        self.constrain(crop, scale)
    }

    /// Enforces the minimum on-screen size and the image bounds.
    ///
    /// The minimum is `MIN_CROP_SCREEN_SIZE` screen pixels, so it shrinks in
    /// canvas units as the view zooms in. The image bounds win over the
    /// minimum when the image is smaller than it.
    pub fn constrain(&self, mut crop: CropSettings, scale: f64) -> CropSettings {
        let min = if scale > 0.0 {
            MIN_CROP_SCREEN_SIZE / scale
        } else {
            MIN_CROP_SCREEN_SIZE
        };
        crop.width = crop.width.max(min);
        crop.height = crop.height.max(min);

        if let Some(image) = self.image_size {
            crop.width = crop.width.min(image.width);
            crop.height = crop.height.min(image.height);

            crop.x = crop.x.min(image.width - crop.width).max(0.0);
            crop.y = crop.y.min(image.height - crop.height).max(0.0);

            crop.width = crop.width.min(image.width - crop.x);
            crop.height = crop.height.min(image.height - crop.y);
        }

        crop
    }
}
