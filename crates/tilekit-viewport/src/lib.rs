//! # Tilekit Viewport
//!
//! Owns the live pan/zoom transform of the canvas and the gesture state
//! machine that drives it: mouse pan, wheel zoom, two-finger pinch and
//! dragging or resizing the crop box.
//!
//! Inputs are plain screen coordinates relative to the container's top-left
//! corner, so the controller can be driven from any windowing toolkit or
//! from tests.

pub mod controller;
pub mod crop;
pub mod gesture;

pub use controller::ViewportController;
pub use crop::{CropEditor, CropHandle};
pub use gesture::{GestureState, PinchStart};
