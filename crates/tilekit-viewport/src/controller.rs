//! Viewport controller: pan, zoom and pinch over a [`CoordinateSystem`].
//!
//! The controller is the only writer of the view transform. Every change is
//! pushed into the coordinate system immediately, so conversions made right
//! after a gesture step already see the new mapping.

use std::sync::Arc;

use tilekit_core::{
    CoordinateSystem, CropSettings, EventBus, Point, PuzzleEvent, Size, Transform, ViewportLimits,
};

use crate::crop::{CropEditor, CropHandle};
use crate::gesture::{GestureState, PinchStart};

/// Center of the container as a fraction of its size.
pub const CONTAINER_CENTER: Point = Point { x: 0.5, y: 0.5 };

pub struct ViewportController {
    coords: CoordinateSystem,
    limits: ViewportLimits,
    gesture: GestureState,
    crop_editor: CropEditor,
    bus: Option<Arc<EventBus>>,
}

impl ViewportController {
    /// Invalid `limits` are logged and replaced by the defaults.
    pub fn new(container_size: Size, limits: ViewportLimits) -> Self {
        let limits = match limits.validate() {
            Ok(()) => limits,
            Err(e) => {
                tracing::warn!("Using default zoom limits: {}", e);
                ViewportLimits::default()
            }
        };
        Self {
            coords: CoordinateSystem::new(container_size),
            limits,
            gesture: GestureState::Idle,
            crop_editor: CropEditor::new(),
            bus: None,
        }
    }

    /// Publishes `ViewportChanged` and `CropSettingsChanged` on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn coordinates(&self) -> &CoordinateSystem {
        &self.coords
    }

    pub fn transform(&self) -> Transform {
        self.coords.transform()
    }

    pub fn scale(&self) -> f64 {
        self.coords.scale()
    }

    pub fn limits(&self) -> ViewportLimits {
        self.limits
    }

    /// Replaces the zoom bounds and re-clamps the current scale into them.
    /// Invalid limits are logged and the current ones kept.
    pub fn set_limits(&mut self, limits: ViewportLimits) -> bool {
        if let Err(e) = limits.validate() {
            tracing::warn!("Rejected zoom limits: {}", e);
            return false;
        }
        self.limits = limits;
        let scale = self.scale();
        if self.limits.clamp_scale(scale) != scale {
            self.set_scale(scale, CONTAINER_CENTER);
        }
        true
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn crop_editor(&self) -> &CropEditor {
        &self.crop_editor
    }

    pub fn set_image_size(&mut self, size: Option<Size>) {
        self.crop_editor.set_image_size(size);
    }

    pub fn resize_container(&mut self, size: Size) {
        self.coords.update_container_size(size);
    }

    pub fn set_canvas_element_size(&mut self, rendered: Size) {
        self.coords.update_canvas_element_size(rendered);
    }

    // ---- pan ----------------------------------------------------------

    /// Starts a pan at screen point `(x, y)`. Refused while another gesture
    /// is active.
    pub fn start_pan(&mut self, x: f64, y: f64) -> bool {
        if !self.gesture.is_idle() {
            tracing::debug!("start_pan ignored while {}", self.gesture);
            return false;
        }
        self.gesture = GestureState::Panning {
            start: Point::new(x, y),
            origin: self.transform(),
        };
        tracing::debug!("Pan started at ({:.1}, {:.1})", x, y);
        true
    }

    /// Moves the view with the pointer. Ignored unless a pan is active.
    pub fn update_pan(&mut self, x: f64, y: f64) -> bool {
        let GestureState::Panning { start, origin } = self.gesture else {
            return false;
        };
        let current = self.transform();
        self.apply_transform(Transform::new(
            current.scale,
            origin.translate_x + (x - start.x),
            origin.translate_y + (y - start.y),
        ));
        true
    }

    pub fn end_pan(&mut self) {
        if matches!(self.gesture, GestureState::Panning { .. }) {
            tracing::debug!("Pan ended: {}", self.transform());
            self.gesture = GestureState::Idle;
        }
    }

    /// Shifts the view by a screen-space delta outside of any gesture.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let t = self.transform();
        self.apply_transform(Transform::new(
            t.scale,
            t.translate_x + dx,
            t.translate_y + dy,
        ));
    }

    // ---- zoom ---------------------------------------------------------

    /// Steps the scale by `delta * zoom_step`, anchored at `center` (a
    /// fraction of the container size).
    pub fn zoom(&mut self, delta: f64, center: Point) {
        let target = self.scale() + delta * self.limits.zoom_step;
        self.set_scale(target, center);
    }

    /// Mouse wheel at a screen point: scrolling down zooms out.
    pub fn wheel(&mut self, delta_y: f64, pointer: Point) {
        let delta = if delta_y > 0.0 { -1.0 } else { 1.0 };
        let center = self.fraction_of_container(pointer);
        self.zoom(delta, center);
    }

    pub fn zoom_in(&mut self) {
        self.zoom(1.0, CONTAINER_CENTER);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(-1.0, CONTAINER_CENTER);
    }

    /// Sets the scale so the canvas point under `center` stays put on screen.
    ///
    /// `center` is a fraction of the container size; the requested scale is
    /// clamped to the configured limits first.
    pub fn set_scale(&mut self, scale: f64, center: Point) {
        let center_px = Point::new(
            self.coords.container_size().width * center.x,
            self.coords.container_size().height * center.y,
        );
        self.scale_about(scale, center_px);
    }

    pub fn reset_transform(&mut self) {
        self.gesture = GestureState::Idle;
        self.apply_transform(Transform::identity());
    }

    fn scale_about(&mut self, scale: f64, center_px: Point) {
        let new_scale = self.limits.clamp_scale(scale);
        let old = self.transform();
        let ratio = new_scale / old.scale;
        self.apply_transform(Transform::new(
            new_scale,
            center_px.x + (old.translate_x - center_px.x) * ratio,
            center_px.y + (old.translate_y - center_px.y) * ratio,
        ));
    }

    fn fraction_of_container(&self, screen: Point) -> Point {
        let size = self.coords.container_size();
        if size.is_empty() {
            return CONTAINER_CENTER;
        }
        Point::new(screen.x / size.width, screen.y / size.height)
    }

    // ---- pinch --------------------------------------------------------

    /// Starts a pinch from two touch points. Refused while another gesture
    /// is active or when the points coincide.
    pub fn start_pinch(&mut self, a: Point, b: Point) -> bool {
        if !self.gesture.is_idle() {
            tracing::debug!("start_pinch ignored while {}", self.gesture);
            return false;
        }
        let distance = a.distance_to(&b);
        if distance <= f64::EPSILON {
            tracing::debug!("start_pinch ignored: touch points coincide");
            return false;
        }
        self.gesture = GestureState::PinchZooming(PinchStart {
            distance,
            scale: self.scale(),
            center: a.midpoint(&b),
        });
        tracing::debug!("Pinch started, distance {:.1}", distance);
        true
    }

    /// `scale = start_scale * distance / start_distance`, anchored at the
    /// current midpoint.
    pub fn update_pinch(&mut self, a: Point, b: Point) -> bool {
        let GestureState::PinchZooming(start) = self.gesture else {
            return false;
        };
        let distance = a.distance_to(&b);
        let center = self.fraction_of_container(a.midpoint(&b));
        self.set_scale(start.scale * (distance / start.distance), center);
        true
    }

    pub fn end_pinch(&mut self) {
        if matches!(self.gesture, GestureState::PinchZooming(_)) {
            tracing::debug!("Pinch ended at scale {:.3}", self.scale());
            self.gesture = GestureState::Idle;
        }
    }

    // ---- touch --------------------------------------------------------

    /// New set of active touches after a finger went down.
    ///
    /// One touch starts a pan, two start a pinch. A change in the pointer
    /// count cancels whatever gesture was running; the transform it had
    /// applied so far stays.
    pub fn touch_start(&mut self, touches: &[Point]) {
        match touches {
            [p] => {
                self.cancel_touch_gesture();
                self.start_pan(p.x, p.y);
            }
            [a, b] => {
                self.cancel_touch_gesture();
                self.start_pinch(*a, *b);
            }
            _ => self.cancel_touch_gesture(),
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        match (touches, self.gesture) {
            ([p], GestureState::Panning { .. }) => {
                self.update_pan(p.x, p.y);
            }
            ([a, b], GestureState::PinchZooming(_)) => {
                self.update_pinch(*a, *b);
            }
            (_, GestureState::Panning { .. } | GestureState::PinchZooming(_)) => {
                tracing::debug!(
                    "Touch count {} does not match {}, cancelling",
                    touches.len(),
                    self.gesture
                );
                self.cancel_touch_gesture();
            }
            _ => {}
        }
    }

    /// Touches still down after a finger lifted.
    pub fn touch_end(&mut self, remaining: &[Point]) {
        match (remaining.len(), self.gesture) {
            (0, _) => self.cancel_touch_gesture(),
            (n, GestureState::PinchZooming(_)) if n != 2 => self.end_pinch(),
            _ => {}
        }
    }

    fn cancel_touch_gesture(&mut self) {
        match self.gesture {
            GestureState::Panning { .. } => self.end_pan(),
            GestureState::PinchZooming(_) => self.end_pinch(),
            _ => {}
        }
    }

    // ---- crop box -----------------------------------------------------

    /// Starts dragging the crop box (or one of its handles) at a screen point.
    pub fn begin_crop_edit(&mut self, handle: CropHandle, x: f64, y: f64, crop: CropSettings) -> bool {
        if !self.gesture.is_idle() {
            tracing::debug!("begin_crop_edit ignored while {}", self.gesture);
            return false;
        }
        self.gesture = GestureState::Resizing {
            handle,
            start: Point::new(x, y),
            initial: crop,
        };
        tracing::debug!("Crop edit started with handle {}", handle);
        true
    }

    /// Crop resulting from the pointer now being at `(x, y)`.
    ///
    /// The result is published as `CropSettingsChanged`. Returns `None`
    /// outside a crop edit.
    pub fn update_crop_edit(&mut self, x: f64, y: f64) -> Option<CropSettings> {
        let GestureState::Resizing {
            handle,
            start,
            initial,
        } = self.gesture
        else {
            return None;
        };
        let (dx, dy) = self.coords.screen_to_canvas_delta(x - start.x, y - start.y);
        let crop = self
            .crop_editor
            .apply(handle, &initial, dx, dy, self.scale());
        self.emit(PuzzleEvent::CropSettingsChanged { crop });
        Some(crop)
    }

    pub fn end_crop_edit(&mut self) {
        if matches!(self.gesture, GestureState::Resizing { .. }) {
            tracing::debug!("Crop edit ended");
            self.gesture = GestureState::Idle;
        }
    }

    /// Drops any active gesture without reverting what it already applied.
    pub fn cancel_gesture(&mut self) {
        if !self.gesture.is_idle() {
            tracing::debug!("Cancelled {}", self.gesture);
            self.gesture = GestureState::Idle;
        }
    }

    fn apply_transform(&mut self, transform: Transform) {
        if self.coords.update_transform(transform) {
            self.emit(PuzzleEvent::ViewportChanged { transform });
        }
    }

    fn emit(&self, event: PuzzleEvent) {
        if let Some(bus) = &self.bus {
            bus.emit(event);
        }
    }
}

impl std::fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportController")
            .field("transform", &self.transform())
            .field("gesture", &self.gesture)
            .field("limits", &self.limits)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ViewportController {
        ViewportController::new(Size::new(800.0, 600.0), ViewportLimits::default())
    }

    #[test]
    fn test_invalid_limits_fall_back() {
        let crossed = ViewportLimits {
            min_scale: 3.0,
            max_scale: 2.0,
            ..Default::default()
        };
        let mut vp = ViewportController::new(Size::new(800.0, 600.0), crossed);
        assert_eq!(vp.limits(), ViewportLimits::default());
        vp.zoom(1.0, CONTAINER_CENTER);
        assert!((vp.scale() - 1.1).abs() < 1e-12);

        assert!(!vp.set_limits(crossed));
        assert_eq!(vp.limits(), ViewportLimits::default());
        vp.set_scale(50.0, CONTAINER_CENTER);
        assert_eq!(vp.scale(), 5.0);

        let tight = ViewportLimits {
            min_scale: 0.5,
            max_scale: 2.0,
            ..Default::default()
        };
        assert!(vp.set_limits(tight));
        assert_eq!(vp.scale(), 2.0);
    }

    #[test]
    fn test_pan_moves_translate_only() {
        let mut vp = controller();
        vp.set_scale(2.0, Point::origin());
        assert!(vp.start_pan(100.0, 100.0));
        assert!(vp.update_pan(130.0, 80.0));
        assert_eq!(vp.transform(), Transform::new(2.0, 30.0, -20.0));
        vp.end_pan();
        assert!(vp.gesture().is_idle());
    }

    #[test]
    fn test_update_after_end_is_ignored() {
        let mut vp = controller();
        vp.start_pan(0.0, 0.0);
        vp.update_pan(10.0, 10.0);
        vp.end_pan();
        assert!(!vp.update_pan(500.0, 500.0));
        assert_eq!(vp.transform(), Transform::new(1.0, 10.0, 10.0));
    }

    #[test]
    fn test_gestures_are_exclusive() {
        let mut vp = controller();
        assert!(vp.start_pan(0.0, 0.0));
        assert!(!vp.start_pinch(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        assert!(!vp.begin_crop_edit(CropHandle::Body, 0.0, 0.0, CropSettings::default()));
        vp.end_pan();
        assert!(vp.start_pinch(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        assert!(!vp.start_pan(0.0, 0.0));
    }

    #[test]
    fn test_zoom_steps_and_clamps() {
        let mut vp = controller();
        vp.zoom(1.0, CONTAINER_CENTER);
        assert!((vp.scale() - 1.1).abs() < 1e-12);
        vp.zoom(1000.0, CONTAINER_CENTER);
        assert_eq!(vp.scale(), 5.0);
        vp.zoom(-1000.0, CONTAINER_CENTER);
        assert_eq!(vp.scale(), 0.1);
    }

    #[test]
    fn test_set_scale_rejects_zero_by_clamping() {
        let mut vp = controller();
        vp.set_scale(0.0, CONTAINER_CENTER);
        assert_eq!(vp.scale(), 0.1);
        vp.set_scale(-3.0, CONTAINER_CENTER);
        assert_eq!(vp.scale(), 0.1);
    }

    #[test]
    fn test_wheel_direction() {
        let mut vp = controller();
        vp.wheel(120.0, Point::new(400.0, 300.0));
        assert!((vp.scale() - 0.9).abs() < 1e-12);
        vp.wheel(-120.0, Point::new(400.0, 300.0));
        assert!((vp.scale() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pinch_scales_by_distance_ratio() {
        let mut vp = controller();
        assert!(vp.start_pinch(Point::new(300.0, 300.0), Point::new(500.0, 300.0)));
        assert!(vp.update_pinch(Point::new(200.0, 300.0), Point::new(600.0, 300.0)));
        assert!((vp.scale() - 2.0).abs() < 1e-12);
        vp.end_pinch();
        assert!(!vp.update_pinch(Point::new(0.0, 0.0), Point::new(800.0, 0.0)));
    }

    #[test]
    fn test_coincident_pinch_is_refused() {
        let mut vp = controller();
        assert!(!vp.start_pinch(Point::new(10.0, 10.0), Point::new(10.0, 10.0)));
        assert!(vp.gesture().is_idle());
    }

    #[test]
    fn test_set_limits_reclamps_scale() {
        let mut vp = controller();
        vp.set_scale(4.0, CONTAINER_CENTER);
        vp.set_limits(ViewportLimits {
            max_scale: 2.0,
            ..Default::default()
        });
        assert_eq!(vp.scale(), 2.0);
    }

    #[test]
    fn test_reset_transform() {
        let mut vp = controller();
        vp.pan_by(40.0, 40.0);
        vp.zoom_in();
        vp.reset_transform();
        assert_eq!(vp.transform(), Transform::identity());
    }
}
