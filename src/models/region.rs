// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region data structures.
//!
//! This module defines the rectangles and points the region selector works
//! with. All coordinates are in viewport (preview) pixels unless a type says
//! otherwise.

use serde::{Deserialize, Serialize};

/// A 2D point in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle with non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build the normalized rectangle spanned by two points.
    ///
    /// The drag direction does not matter: the origin is always the
    /// top-left corner and the size is never negative.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check whether the point lies inside the rectangle (edges included).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Position of one of the four corners.
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.x, self.y),
            Corner::TopRight => Point::new(self.right(), self.y),
            Corner::BottomLeft => Point::new(self.x, self.bottom()),
            Corner::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }
}

/// One of the four resize handles of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The diagonally opposite corner, used as the fixed anchor when resizing.
    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Ratio between source resolution and displayed viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

/// A finalized region together with the scale factors in effect when it was
/// finalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedRegion {
    pub rect: Rect,
    pub scale: ScaleFactors,
}

impl SelectedRegion {
    pub fn new(rect: Rect, scale: ScaleFactors) -> Self {
        Self { rect, scale }
    }

    /// The region expressed in source pixels, without rounding.
    pub fn source_rect(&self) -> Rect {
        crate::util::geometry::to_source_rect(&self.rect, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_is_direction_independent() {
        let a = Point::new(300.0, 250.0);
        let b = Point::new(100.0, 100.0);

        let forward = Rect::from_corners(b, a);
        let backward = Rect::from_corners(a, b);

        assert_eq!(forward, backward);
        assert_eq!(forward, Rect::new(100.0, 100.0, 200.0, 150.0));
    }

    #[test]
    fn test_from_corners_mixed_directions() {
        // Drag up and to the right
        let r = Rect::from_corners(Point::new(10.0, 90.0), Point::new(60.0, 40.0));
        assert_eq!(r, Rect::new(10.0, 40.0, 50.0, 50.0));
    }

    #[test]
    fn test_corners_and_opposites() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.corner(Corner::TopLeft), Point::new(10.0, 20.0));
        assert_eq!(r.corner(Corner::BottomRight), Point::new(40.0, 60.0));

        for corner in Corner::ALL {
            assert_eq!(corner.opposite().opposite(), corner);
            // Opposite corners span the rectangle itself
            let spanned = Rect::from_corners(r.corner(corner), r.corner(corner.opposite()));
            assert_eq!(spanned, r);
        }
    }

    #[test]
    fn test_contains_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(10.1, 5.0)));
    }

    #[test]
    fn test_zero_area() {
        assert!(!Rect::new(5.0, 5.0, 0.0, 10.0).has_area());
        assert!(Rect::new(5.0, 5.0, 1.0, 1.0).has_area());
    }
}
