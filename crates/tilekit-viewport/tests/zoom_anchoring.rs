//! The canvas point under the zoom center must not move on screen.

use proptest::prelude::*;
use tilekit_core::{Point, Size, ViewportLimits};
use tilekit_viewport::ViewportController;

fn assert_close(a: Point, b: Point) {
    assert!(
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6,
        "{:?} != {:?}",
        a,
        b
    );
}

proptest! {
    #[test]
    fn set_scale_keeps_center_fixed(
        start_scale in 0.1f64..5.0,
        new_scale in 0.1f64..5.0,
        pan_x in -2000.0f64..2000.0,
        pan_y in -2000.0f64..2000.0,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
    ) {
        let mut vp = ViewportController::new(Size::new(1024.0, 768.0), ViewportLimits::default());
        vp.set_scale(start_scale, Point::origin());
        vp.pan_by(pan_x, pan_y);

        let center_px = Point::new(1024.0 * fx, 768.0 * fy);
        let anchored = vp.coordinates().screen_to_canvas(center_px);

        vp.set_scale(new_scale, Point::new(fx, fy));

        let after = vp.coordinates().canvas_to_screen(anchored);
        prop_assert!((after.x - center_px.x).abs() < 1e-6);
        prop_assert!((after.y - center_px.y).abs() < 1e-6);
        prop_assert!((vp.scale() - new_scale).abs() < 1e-12);
    }

    #[test]
    fn scale_never_leaves_limits(deltas in prop::collection::vec(-30.0f64..30.0, 1..40)) {
        let limits = ViewportLimits::default();
        let mut vp = ViewportController::new(Size::new(640.0, 480.0), limits);
        for d in deltas {
            vp.zoom(d, Point::new(0.5, 0.5));
            prop_assert!(vp.scale() >= limits.min_scale && vp.scale() <= limits.max_scale);
        }
    }
}

#[test]
fn test_wheel_zoom_anchors_at_pointer() {
    let mut vp = ViewportController::new(Size::new(800.0, 600.0), ViewportLimits::default());
    vp.pan_by(-120.0, 45.0);

    let pointer = Point::new(620.0, 140.0);
    let under_pointer = vp.coordinates().screen_to_canvas(pointer);

    vp.wheel(-3.0, pointer);
    vp.wheel(-3.0, pointer);
    vp.wheel(5.0, pointer);

    assert_close(vp.coordinates().canvas_to_screen(under_pointer), pointer);
}

#[test]
fn test_pinch_anchors_at_midpoint() {
    let mut vp = ViewportController::new(Size::new(800.0, 600.0), ViewportLimits::default());
    let a = Point::new(300.0, 200.0);
    let b = Point::new(500.0, 400.0);
    let mid = a.midpoint(&b);
    let under_mid = vp.coordinates().screen_to_canvas(mid);

    vp.touch_start(&[a, b]);
    vp.touch_move(&[Point::new(250.0, 150.0), Point::new(550.0, 450.0)]);

    assert!((vp.scale() - 1.5).abs() < 1e-9);
    assert_close(vp.coordinates().canvas_to_screen(under_mid), mid);
}
