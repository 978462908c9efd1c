//! Node placement.
//!
//! A [`Layout`] maps node identifiers to 2D points. It is produced by the
//! force-directed [`LayoutEngine`] once per view and never persisted.

pub mod force;

pub use force::LayoutEngine;

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::Serialize;

/// A point (or vector) in layout space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
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

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// Axis-aligned bounding box of a layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Node coordinates produced by one layout run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    positions: BTreeMap<String, Point>,
    iterations: usize,
    converged: bool,
}

impl Layout {
    pub(crate) fn new(
        positions: BTreeMap<String, Point>,
        iterations: usize,
        converged: bool,
    ) -> Self {
        Self {
            positions,
            iterations,
            converged,
        }
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    /// Positions ordered by node identifier
    pub fn positions(&self) -> impl Iterator<Item = (&str, Point)> {
        self.positions.iter().map(|(id, p)| (id.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Solver iterations run; 0 when the solver was skipped
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// True if the solver stopped on the convergence threshold rather than the iteration cap
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.positions.values();
        let first = points.next()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.distance(Point::ORIGIN), 5.0);
        assert_eq!(a + Point::new(1.0, 1.0), Point::new(4.0, 5.0));
        assert_eq!(a - Point::new(1.0, 1.0), Point::new(2.0, 3.0));
        assert_eq!(a * 2.0, Point::new(6.0, 8.0));
    }

    #[test]
    fn test_bounds() {
        let positions = [
            ("a".to_string(), Point::new(-10.0, 5.0)),
            ("b".to_string(), Point::new(30.0, -15.0)),
        ]
        .into_iter()
        .collect();
        let layout = Layout::new(positions, 3, true);

        let bounds = layout.bounds().unwrap();
        assert_eq!(bounds.width(), 40.0);
        assert_eq!(bounds.height(), 20.0);
        assert_eq!(bounds.center(), Point::new(10.0, -5.0));
        assert!(Layout::default().bounds().is_none());
    }
}
