//! Gesture sequencing: touch transitions, cancellation and crop editing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tilekit_core::{
    CropSettings, EventBus, EventCategory, EventFilter, Point, PuzzleEvent, Size, Transform,
    ViewportLimits,
};
use tilekit_viewport::{CropHandle, GestureState, ViewportController};

fn controller() -> ViewportController {
    ViewportController::new(Size::new(800.0, 600.0), ViewportLimits::default())
}

#[test]
fn test_one_finger_pans() {
    let mut vp = controller();
    vp.touch_start(&[Point::new(100.0, 100.0)]);
    vp.touch_move(&[Point::new(150.0, 90.0)]);
    vp.touch_end(&[]);

    assert_eq!(vp.transform(), Transform::new(1.0, 50.0, -10.0));
    assert!(vp.gesture().is_idle());
}

#[test]
fn test_second_finger_switches_pan_to_pinch() {
    let mut vp = controller();
    vp.touch_start(&[Point::new(100.0, 100.0)]);
    vp.touch_move(&[Point::new(120.0, 100.0)]);
    vp.touch_start(&[Point::new(120.0, 100.0), Point::new(220.0, 100.0)]);

    assert!(matches!(vp.gesture(), GestureState::PinchZooming(_)));
    // the partial pan stays applied
    assert_eq!(vp.transform().translate_x, 20.0);
}

#[test]
fn test_lifting_a_finger_cancels_pinch() {
    let mut vp = controller();
    vp.touch_start(&[Point::new(300.0, 300.0), Point::new(500.0, 300.0)]);
    vp.touch_move(&[Point::new(250.0, 300.0), Point::new(550.0, 300.0)]);
    let scale_at_cancel = vp.scale();

    vp.touch_end(&[Point::new(250.0, 300.0)]);
    assert!(vp.gesture().is_idle());

    // stray moves from the remaining finger change nothing
    vp.touch_move(&[Point::new(0.0, 0.0)]);
    vp.touch_move(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    assert_eq!(vp.scale(), scale_at_cancel);
    assert!(vp.gesture().is_idle());
}

#[test]
fn test_pointer_count_mismatch_during_pan_cancels() {
    let mut vp = controller();
    vp.touch_start(&[Point::new(0.0, 0.0)]);
    vp.touch_move(&[Point::new(0.0, 0.0), Point::new(50.0, 50.0)]);
    assert!(vp.gesture().is_idle());
}

#[test]
fn test_three_fingers_leave_no_gesture() {
    let mut vp = controller();
    vp.touch_start(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)]);
    assert!(vp.gesture().is_idle());
}

#[test]
fn test_crop_edit_uses_canvas_units() {
    let mut vp = controller();
    vp.set_scale(2.0, Point::origin());
    vp.set_image_size(Some(Size::new(1000.0, 1000.0)));

    let initial = CropSettings::new(100.0, 100.0, 200.0, 200.0);
    assert!(vp.begin_crop_edit(CropHandle::SE, 400.0, 400.0, initial));

    // 40 screen px at 2x is 20 canvas units
    let crop = vp.update_crop_edit(440.0, 460.0).expect("crop edit active");
    assert_eq!(crop, CropSettings::new(100.0, 100.0, 220.0, 230.0));

    vp.end_crop_edit();
    assert!(vp.update_crop_edit(500.0, 500.0).is_none());
}

#[test]
fn test_crop_edit_publishes_changes() {
    let bus = Arc::new(EventBus::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.subscribe(EventFilter::Categories(vec![EventCategory::Crop]), move |e| {
        if let PuzzleEvent::CropSettingsChanged { crop } = e {
            sink.lock().push(*crop);
        }
    });

    let mut vp = controller().with_event_bus(bus);
    vp.begin_crop_edit(CropHandle::Body, 0.0, 0.0, CropSettings::new(0.0, 0.0, 50.0, 50.0));
    vp.update_crop_edit(10.0, 0.0);
    vp.update_crop_edit(20.0, 5.0);
    vp.end_crop_edit();

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1], CropSettings::new(20.0, 5.0, 50.0, 50.0));
}

#[test]
fn test_viewport_changes_are_published() {
    let bus = Arc::new(EventBus::new());
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Viewport]),
        move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        },
    );

    let mut vp = controller().with_event_bus(bus);
    vp.start_pan(0.0, 0.0);
    vp.update_pan(5.0, 5.0);
    vp.update_pan(10.0, 10.0);
    vp.end_pan();
    vp.update_pan(50.0, 50.0);
    vp.zoom_in();

    assert_eq!(count.load(Ordering::SeqCst), 3);
}
