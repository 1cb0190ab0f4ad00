// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between the preview
//! viewport (where the pointer lives) and the capture source's native pixel
//! grid.

use crate::models::region::{Point, Rect, ScaleFactors};

/// On-screen size of the preview, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Create a viewport; both dimensions must be positive and finite.
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Some(Self { width, height })
        } else {
            None
        }
    }

    /// Clamp a point into `[0, width] x [0, height]`, each axis on its own.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }

    pub fn contains_rect(&self, r: &Rect) -> bool {
        const EPS: f64 = 1e-9;
        r.x >= -EPS
            && r.y >= -EPS
            && r.right() <= self.width + EPS
            && r.bottom() <= self.height + EPS
    }
}

/// Native resolution of a capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSize {
    pub width: u32,
    pub height: u32,
}

impl SourceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Integer rectangle on a pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Scale factors mapping viewport pixels to source pixels.
pub fn scale_factors(source: SourceSize, viewport: Viewport) -> ScaleFactors {
    ScaleFactors {
        x: source.width as f64 / viewport.width,
        y: source.height as f64 / viewport.height,
    }
}

/// Map a viewport rectangle into source pixels, keeping sub-pixel precision.
pub fn to_source_rect(rect: &Rect, scale: ScaleFactors) -> Rect {
    Rect {
        x: rect.x * scale.x,
        y: rect.y * scale.y,
        width: rect.width * scale.x,
        height: rect.height * scale.y,
    }
}

/// Map a source rectangle back into viewport pixels.
pub fn to_viewport_rect(rect: &Rect, scale: ScaleFactors) -> Rect {
    Rect {
        x: rect.x / scale.x,
        y: rect.y / scale.y,
        width: rect.width / scale.x,
        height: rect.height / scale.y,
    }
}

/// Truncate a source rectangle onto the integer pixel grid.
///
/// Negative or non-finite components collapse to zero.
pub fn to_pixel_rect(rect: &Rect) -> PixelRect {
    let trunc = |v: f64| if v.is_finite() && v > 0.0 { v.trunc() as u32 } else { 0 };
    PixelRect {
        x: trunc(rect.x),
        y: trunc(rect.y),
        width: trunc(rect.width),
        height: trunc(rect.height),
    }
}

/// Fit an image of the given size into the available area, keeping its
/// aspect ratio. Returns the displayed `(width, height)`.
pub fn fit_size(image: SourceSize, available_width: f64, available_height: f64) -> (f64, f64) {
    if image.width == 0 || image.height == 0 {
        return (0.0, 0.0);
    }
    let img_aspect = image.width as f64 / image.height as f64;
    let available_aspect = available_width / available_height;

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available_width, available_width / img_aspect)
    } else {
        // Image is taller - fit to height
        (available_height * img_aspect, available_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factors() {
        let viewport = Viewport::new(800.0, 450.0).unwrap();
        let scale = scale_factors(SourceSize::new(1600, 900), viewport);
        assert_eq!(scale.x, 2.0);
        assert_eq!(scale.y, 2.0);
    }

    #[test]
    fn test_viewport_rejects_degenerate_sizes() {
        assert!(Viewport::new(0.0, 10.0).is_none());
        assert!(Viewport::new(10.0, -1.0).is_none());
        assert!(Viewport::new(f64::NAN, 10.0).is_none());
        assert!(Viewport::new(1.0, 1.0).is_some());
    }

    #[test]
    fn test_clamp_out_of_bounds() {
        let viewport = Viewport::new(800.0, 450.0).unwrap();

        assert_eq!(viewport.clamp(Point::new(-20.0, 500.0)), Point::new(0.0, 450.0));
        assert_eq!(viewport.clamp(Point::new(900.0, -3.0)), Point::new(800.0, 0.0));
        assert_eq!(viewport.clamp(Point::new(12.5, 40.0)), Point::new(12.5, 40.0));
    }

    #[test]
    fn test_source_viewport_roundtrip() {
        let scale = ScaleFactors { x: 2.4, y: 1.5 };
        let rect = Rect::new(10.3, 20.7, 99.9, 50.1);

        let back = to_viewport_rect(&to_source_rect(&rect, scale), scale);

        assert!((back.x - rect.x).abs() < 0.0001);
        assert!((back.y - rect.y).abs() < 0.0001);
        assert!((back.width - rect.width).abs() < 0.0001);
        assert!((back.height - rect.height).abs() < 0.0001);
    }

    #[test]
    fn test_pixel_rect_truncates() {
        let px = to_pixel_rect(&Rect::new(10.9, 3.2, 100.99, 0.5));
        assert_eq!(px, PixelRect { x: 10, y: 3, width: 100, height: 0 });
        assert!(px.is_empty());

        let neg = to_pixel_rect(&Rect::new(-4.0, f64::INFINITY, 3.0, 3.0));
        assert_eq!(neg.x, 0);
        assert_eq!(neg.y, 0);
    }

    #[test]
    fn test_fit_size() {
        // Wide image in a square area
        let (w, h) = fit_size(SourceSize::new(1600, 900), 800.0, 800.0);
        assert_eq!(w, 800.0);
        assert_eq!(h, 450.0);

        // Tall image
        let (w, h) = fit_size(SourceSize::new(500, 1000), 800.0, 400.0);
        assert_eq!(w, 200.0);
        assert_eq!(h, 400.0);
    }
}
