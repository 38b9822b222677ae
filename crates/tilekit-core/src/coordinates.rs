//! Screen ⇄ canvas coordinate mapping.
//!
//! Screen coordinates are pixels relative to the viewport container's
//! top-left corner. Canvas coordinates live on an unbounded virtual plane
//! that tiles and the crop region are positioned on.
//!
//! Formula:
//! ```text
//! canvas = (screen - translate) / scale
//! screen = canvas * scale + translate
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{self, AffineMatrix, Point, Rect, Size};

/// The live pan/zoom transform applied to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Transform {
    pub const fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn translate(&self) -> Point {
        Point::new(self.translate_x, self.translate_y)
    }

    /// A transform is usable for conversions only with a finite, positive scale.
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite()
            && self.scale > 0.0
            && self.translate_x.is_finite()
            && self.translate_y.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scale: {:.2}x | Translate: ({:.1}, {:.1})",
            self.scale, self.translate_x, self.translate_y
        )
    }
}

/// Bidirectional mapping between screen and canvas space for the current
/// transform, plus cached container and canvas sizes.
#[derive(Debug, Clone, Default)]
pub struct CoordinateSystem {
    transform: Transform,
    container_size: Size,
    canvas_size: Size,
}

/// Snapshot of the mapping state for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinateDebugInfo {
    pub transform: Transform,
    pub container_size: Size,
    pub canvas_size: Size,
    pub visible_area: Rect,
}

impl CoordinateSystem {
    /// Creates a coordinate system with the identity transform.
    pub fn new(container_size: Size) -> Self {
        Self {
            transform: Transform::identity(),
            container_size,
            canvas_size: Size::default(),
        }
    }

    /// Current transform (a copy).
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    /// Canvas element size in canvas units.
    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Replaces the transform.
    ///
    /// Transforms with a non-positive or non-finite scale are rejected and the
    /// previous transform is kept; the viewport clamps scale before it gets
    /// here, so this only guards against misuse.
    pub fn update_transform(&mut self, transform: Transform) -> bool {
        if !transform.is_valid() {
            tracing::warn!("Rejected invalid transform: {}", transform);
            return false;
        }
        self.transform = transform;
        true
    }

    /// Records the container size (viewport resize).
    pub fn update_container_size(&mut self, size: Size) {
        self.container_size = size;
    }

    /// Records the rendered (on-screen, already scaled) size of the canvas
    /// element and caches its size in canvas units.
    pub fn update_canvas_element_size(&mut self, rendered: Size) {
        self.canvas_size = self.screen_to_canvas_size(rendered);
    }

    /// Converts a screen point to canvas space.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        let Transform {
            scale,
            translate_x,
            translate_y,
        } = self.transform;
        Point::new((screen.x - translate_x) / scale, (screen.y - translate_y) / scale)
    }

    /// Converts a canvas point to screen space.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        let Transform {
            scale,
            translate_x,
            translate_y,
        } = self.transform;
        Point::new(canvas.x * scale + translate_x, canvas.y * scale + translate_y)
    }

    pub fn screen_to_canvas_size(&self, size: Size) -> Size {
        Size::new(size.width / self.transform.scale, size.height / self.transform.scale)
    }

    pub fn canvas_to_screen_size(&self, size: Size) -> Size {
        Size::new(size.width * self.transform.scale, size.height * self.transform.scale)
    }

    pub fn screen_to_canvas_rect(&self, rect: &Rect) -> Rect {
        Rect::from_origin_size(
            self.screen_to_canvas(rect.origin()),
            self.screen_to_canvas_size(rect.size()),
        )
    }

    pub fn canvas_to_screen_rect(&self, rect: &Rect) -> Rect {
        Rect::from_origin_size(
            self.canvas_to_screen(rect.origin()),
            self.canvas_to_screen_size(rect.size()),
        )
    }

    /// Converts a screen-space delta (e.g. a pointer drag) to canvas units.
    pub fn screen_to_canvas_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.transform.scale, dy / self.transform.scale)
    }

    /// Canvas-space rectangle currently covered by the container.
    pub fn get_visible_canvas_area(&self) -> Rect {
        let top_left = self.screen_to_canvas(Point::origin());
        let bottom_right = self.screen_to_canvas(Point::new(
            self.container_size.width,
            self.container_size.height,
        ));
        Rect::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y,
        )
    }

    pub fn is_point_visible(&self, canvas_point: &Point) -> bool {
        self.get_visible_canvas_area().contains_point(canvas_point)
    }

    pub fn is_rect_visible(&self, canvas_rect: &Rect) -> bool {
        geometry::rects_intersect(canvas_rect, &self.get_visible_canvas_area())
    }

    /// Distance between two screen points expressed in canvas units.
    pub fn screen_distance_in_canvas(&self, a: Point, b: Point) -> f64 {
        geometry::distance(a, b) / self.transform.scale
    }

    /// Canvas → screen as a 2×3 matrix.
    pub fn get_transform_matrix(&self) -> AffineMatrix {
        AffineMatrix::scale_translate(
            self.transform.scale,
            self.transform.translate_x,
            self.transform.translate_y,
        )
    }

    /// Screen → canvas as a 2×3 matrix.
    pub fn get_inverse_transform_matrix(&self) -> AffineMatrix {
        let inv = 1.0 / self.transform.scale;
        AffineMatrix::scale_translate(
            inv,
            -self.transform.translate_x * inv,
            -self.transform.translate_y * inv,
        )
    }

    pub fn debug_info(&self) -> CoordinateDebugInfo {
        CoordinateDebugInfo {
            transform: self.transform,
            container_size: self.container_size,
            canvas_size: self.canvas_size,
            visible_area: self.get_visible_canvas_area(),
        }
    }
}
