//! Canvas geometry primitives.
//!
//! All coordinates are in canvas pixel space (origin top-left, y grows down).
//! They stay `f64` in memory and are rounded to integers only at the wire
//! boundary (see [`crate::persistence::types`]).

use serde::{Deserialize, Serialize};

/// A pointer position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned rectangle. `width` and `height` are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.abs(),
            height: height.abs(),
        }
    }

    /// Build the rectangle spanned by a drag from `anchor` to `current`.
    ///
    /// The origin is the top-left corner of the span regardless of drag
    /// direction, and the size is the absolute delta.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self {
            x: anchor.x.min(current.x),
            y: anchor.y.min(current.y),
            width: (current.x - anchor.x).abs(),
            height: (current.y - anchor.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// `true` when `p` lies inside or on the edge of the rectangle.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// `true` when both sides are strictly greater than `min`.
    pub fn exceeds(&self, min: f64) -> bool {
        self.width > min && self.height > min
    }

    /// `true` when `inner`, expressed relative to this rectangle's origin,
    /// fits entirely inside it.
    pub fn contains_relative(&self, inner: &Rect) -> bool {
        inner.x >= 0.0
            && inner.y >= 0.0
            && inner.right() <= self.width
            && inner.bottom() <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_drag_normalizes_reverse_direction() {
        let r = Rect::from_drag(Point::new(200.0, 150.0), Point::new(50.0, 20.0));
        assert_eq!(r, Rect::new(50.0, 20.0, 150.0, 130.0));
    }

    #[test]
    fn new_takes_absolute_size() {
        let r = Rect::new(0.0, 0.0, -40.0, -60.0);
        assert_eq!(r.width, 40.0);
        assert_eq!(r.height, 60.0);
    }

    #[test]
    fn contains_includes_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 30.0)));
        assert!(!r.contains(Point::new(31.0, 15.0)));
    }

    #[test]
    fn exceeds_is_strict() {
        assert!(!Rect::new(0.0, 0.0, 30.0, 100.0).exceeds(30.0));
        assert!(Rect::new(0.0, 0.0, 31.0, 31.0).exceeds(30.0));
    }

    #[test]
    fn contains_relative_checks_far_edges() {
        let area = Rect::new(300.0, 300.0, 100.0, 100.0);
        assert!(area.contains_relative(&Rect::new(55.0, 5.0, 40.0, 60.0)));
        assert!(!area.contains_relative(&Rect::new(5.0, 75.0, 40.0, 60.0)));
        assert!(!area.contains_relative(&Rect::new(-1.0, 0.0, 40.0, 60.0)));
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)), 5.0);
    }
}
