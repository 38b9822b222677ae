//! 2D geometry primitives and helpers.
//!
//! Everything here operates within a single coordinate space; the caller
//! decides whether values are screen pixels or canvas units. None of these
//! functions fail: degenerate input (zero-size rectangles, non-positive grid
//! sizes) yields a deterministic result instead of an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin (0, 0).
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }

    /// Returns this point translated by a delta.
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Midpoint between two points.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from a top-left point and a size.
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        rect_center(self)
    }

    /// Inclusive containment test (edges count as inside).
    pub fn contains_point(&self, point: &Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }
}

/// A 2×3 affine matrix in the canvas convention
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
///
/// The viewport only ever produces scale and translation, so `b` and `c` stay
/// zero for matrices built by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineMatrix {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Uniform scale followed by translation.
    pub const fn scale_translate(scale: f64, tx: f64, ty: f64) -> Self {
        Self {
            a: scale,
            b: 0.0,
            c: 0.0,
            d: scale,
            e: tx,
            f: ty,
        }
    }

    /// Applies the matrix to a point.
    pub fn apply(&self, point: Point) -> Point {
        apply_matrix_to_point(point, self)
    }

    /// Returns `self ∘ other` (apply `other` first, then `self`).
    pub fn compose(&self, other: &AffineMatrix) -> AffineMatrix {
        AffineMatrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Center point of a rectangle.
pub fn rect_center(rect: &Rect) -> Point {
    Point::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
}

/// Tests whether two rectangles intersect. Touching edges count as an
/// intersection.
pub fn rects_intersect(r1: &Rect, r2: &Rect) -> bool {
    !(r1.right() < r2.x || r2.right() < r1.x || r1.bottom() < r2.y || r2.bottom() < r1.y)
}

/// Computes the intersection of two rectangles.
///
/// Returns `None` when the intersection has no area, which includes
/// rectangles that only touch and zero-size inputs.
pub fn get_rects_intersection(r1: &Rect, r2: &Rect) -> Option<Rect> {
    let left = r1.x.max(r2.x);
    let top = r1.y.max(r2.y);
    let right = r1.right().min(r2.right());
    let bottom = r1.bottom().min(r2.bottom());

    if left < right && top < bottom {
        Some(Rect::new(left, top, right - left, bottom - top))
    } else {
        None
    }
}

/// Smallest rectangle enclosing all the given rectangles, or `None` for an
/// empty slice.
pub fn get_bounding_rect(rects: &[Rect]) -> Option<Rect> {
    if rects.is_empty() {
        return None;
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for rect in rects {
        min_x = min_x.min(rect.x);
        min_y = min_y.min(rect.y);
        max_x = max_x.max(rect.right());
        max_y = max_y.max(rect.bottom());
    }

    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Clamps a point into the given bounds.
pub fn clamp_point(point: Point, bounds: &Rect) -> Point {
    Point::new(
        bounds.x.max(bounds.right().min(point.x)),
        bounds.y.max(bounds.bottom().min(point.y)),
    )
}

/// Moves a rectangle so it lies inside the bounds, keeping its size.
///
/// A rectangle larger than the bounds is pinned to the bounds' top-left.
pub fn clamp_rect(rect: &Rect, bounds: &Rect) -> Rect {
    let x = bounds.x.max((bounds.right() - rect.width).min(rect.x));
    let y = bounds.y.max((bounds.bottom() - rect.height).min(rect.y));
    Rect::new(x, y, rect.width, rect.height)
}

/// Rounds each coordinate to the nearest multiple of `grid_size`.
///
/// Halves round toward positive infinity so that `-5` on a grid of `10`
/// lands on `0`, matching how the pointer position is rounded on screen.
/// A non-positive or non-finite grid size leaves the point untouched.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return point;
    }
    Point::new(
        snap_value(point.x, grid_size),
        snap_value(point.y, grid_size),
    )
}

fn snap_value(value: f64, grid_size: f64) -> f64 {
    (value / grid_size + 0.5).floor() * grid_size
}

/// Applies an affine matrix to a point.
pub fn apply_matrix_to_point(point: Point, m: &AffineMatrix) -> Point {
    Point::new(
        point.x * m.a + point.y * m.c + m.e,
        point.x * m.b + point.y * m.d + m.f,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid_rounds_half_up() {
        assert_eq!(snap_to_grid(Point::new(105.0, 95.0), 10.0), Point::new(110.0, 100.0));
        assert_eq!(snap_to_grid(Point::new(104.9, 94.9), 10.0), Point::new(100.0, 90.0));
        assert_eq!(snap_to_grid(Point::new(-5.0, -6.0), 10.0), Point::new(0.0, -10.0));
    }

    #[test]
    fn test_snap_to_grid_degenerate_grid() {
        let p = Point::new(3.3, 7.7);
        assert_eq!(snap_to_grid(p, 0.0), p);
        assert_eq!(snap_to_grid(p, -10.0), p);
        assert_eq!(snap_to_grid(p, f64::NAN), p);
    }

    #[test]
    fn test_rects_intersect_touching_edges() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(50.0, 0.0, 50.0, 50.0);
        assert!(rects_intersect(&a, &b));
        assert!(!a.overlaps(&b));
        assert_eq!(get_rects_intersection(&a, &b), None);
    }

    #[test]
    fn test_rects_intersection_area() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 25.0, 100.0, 100.0);
        assert_eq!(
            get_rects_intersection(&a, &b),
            Some(Rect::new(50.0, 25.0, 50.0, 75.0))
        );
    }

    #[test]
    fn test_zero_size_rect_has_no_intersection() {
        let a = Rect::new(10.0, 10.0, 0.0, 0.0);
        let b = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(get_rects_intersection(&a, &b), None);
    }

    #[test]
    fn test_bounding_rect() {
        assert_eq!(get_bounding_rect(&[]), None);
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(40.0, -5.0, 10.0, 10.0),
        ];
        assert_eq!(
            get_bounding_rect(&rects),
            Some(Rect::new(0.0, -5.0, 50.0, 15.0))
        );
    }

    #[test]
    fn test_clamp_point_and_rect() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(clamp_point(Point::new(150.0, -3.0), &bounds), Point::new(100.0, 0.0));

        let r = Rect::new(90.0, 45.0, 20.0, 20.0);
        assert_eq!(clamp_rect(&r, &bounds), Rect::new(80.0, 30.0, 20.0, 20.0));

        let too_big = Rect::new(10.0, 10.0, 200.0, 200.0);
        assert_eq!(clamp_rect(&too_big, &bounds).origin(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_matrix_compose_with_identity() {
        let m = AffineMatrix::scale_translate(2.0, 10.0, -4.0);
        assert_eq!(m.compose(&AffineMatrix::identity()), m);
        assert_eq!(AffineMatrix::identity().compose(&m), m);
        assert_eq!(m.apply(Point::new(1.0, 1.0)), Point::new(12.0, -2.0));
    }
}
