//! Integer grid geometry shared by the canvas, draw engine, and dirty tracking.
//!
//! All rectangles are half-open: a rectangle at `(x, y)` with size `(w, h)`
//! covers columns `x..x + w` and rows `y..y + h`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

// ============================================================================
// Points
// ============================================================================

/// A cell coordinate. Canvas space and layer-local space both use this type;
/// the two differ by the owning layer's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `self + rhs`, or `None` when a coordinate leaves the `i32` range.
    pub fn checked_add(self, rhs: Point) -> Option<Point> {
        Some(Point::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    /// `self - rhs`, or `None` when a coordinate leaves the `i32` range.
    ///
    /// Used for canvas-to-layer translation; a point that cannot be
    /// represented in layer space is outside the layer.
    pub fn checked_sub(self, rhs: Point) -> Option<Point> {
        Some(Point::new(self.x.checked_sub(rhs.x)?, self.y.checked_sub(rhs.y)?))
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

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

// ============================================================================
// Rectangles
// ============================================================================

/// Axis-aligned rectangle used for crops, selections, and dirty regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle. Returns `None` unless both dimensions are positive.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            None
        } else {
            Some(Self {
                x,
                y,
                width,
                height,
            })
        }
    }

    /// Builds a rectangle from min/max bounds (inclusive min, exclusive max).
    pub fn from_min_max(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Self> {
        let width = max_x.checked_sub(min_x)?;
        let height = max_y.checked_sub(min_y)?;
        Self::new(min_x, min_y, width, height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Exclusive right edge, saturating at `i32::MAX`.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `i32::MAX`.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Returns true if rectangle has a positive area.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Number of cells covered, zero for degenerate rectangles.
    pub fn area(&self) -> usize {
        if self.is_valid() {
            self.width as usize * self.height as usize
        } else {
            0
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Overlapping region of two rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        Rect::from_min_max(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_new_rejects_empty_area() {
        assert!(Rect::new(0, 0, 0, 5).is_none());
        assert!(Rect::new(0, 0, 5, -1).is_none());
        assert!(Rect::new(-3, -3, 1, 1).is_some());
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(2, 2, 3, 3).unwrap();
        assert!(rect.contains(Point::new(2, 2)));
        assert!(rect.contains(Point::new(4, 4)));
        assert!(!rect.contains(Point::new(5, 4)));
        assert!(!rect.contains(Point::new(1, 3)));
    }

    #[test]
    fn intersection_of_disjoint_rects_is_none() {
        let a = Rect::new(0, 0, 2, 2).unwrap();
        let b = Rect::new(2, 0, 2, 2).unwrap();
        assert!(a.intersection(&b).is_none());

        let c = Rect::new(1, 1, 5, 5).unwrap();
        assert_eq!(a.intersection(&c), Rect::new(1, 1, 1, 1));
    }

    #[test]
    fn point_arithmetic() {
        let p = Point::new(3, -2) - Point::new(1, 1);
        assert_eq!(p, Point::new(2, -3));
        assert_eq!(p + Point::new(1, 1), Point::new(3, -2));
    }

    #[test]
    fn checked_translation_reports_overflow() {
        let far = Point::new(i32::MIN, 0);
        assert_eq!(Point::new(0, 0).checked_sub(far), None);
        assert_eq!(far.checked_sub(Point::new(1, 0)), None);
        assert_eq!(Point::new(i32::MAX, 5).checked_add(Point::new(1, 0)), None);
        assert_eq!(
            Point::new(4, 5).checked_sub(Point::new(1, 1)),
            Some(Point::new(3, 4))
        );
    }

    #[test]
    fn edges_saturate_near_the_limit() {
        let rect = Rect::new(i32::MAX - 1, 0, 10, 1).unwrap();
        assert_eq!(rect.right(), i32::MAX);
        assert!(rect.contains(Point::new(i32::MAX - 1, 0)));
    }
}
