// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Moving and resizing a finalized region.
//!
//! Resizing re-anchors the opposite corner and hands control back to the
//! selection state machine, so a resize ends exactly like a fresh drag.

use super::region::{Corner, Point, Rect};
use super::selection::{Gesture, RegionSelector, SelectionState};
use crate::util::geometry::Viewport;
use serde::{Deserialize, Serialize};

/// How a move is clamped when the region hits a viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveClamp {
    /// Each axis is clamped on its own.
    #[default]
    Independent,
    /// When one axis clamps, the other axis' delta shrinks by the same ratio.
    Proportional,
}

/// What part of a region the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Corner(Corner),
    Body,
}

/// Hit-test a point against a region's handles and body.
///
/// Corner handles win over the body so that small regions stay resizable.
pub fn hit_test(rect: &Rect, p: Point, handle_radius: f64) -> Option<Hit> {
    let near = |c: Point| (c.x - p.x).abs() <= handle_radius && (c.y - p.y).abs() <= handle_radius;

    Corner::ALL
        .into_iter()
        .find(|&corner| near(rect.corner(corner)))
        .map(Hit::Corner)
        .or_else(|| rect.contains(p).then_some(Hit::Body))
}

/// Translate a rectangle by `(dx, dy)` while keeping it inside the viewport.
pub fn translate_clamped(rect: &Rect, dx: f64, dy: f64, viewport: Viewport, policy: MoveClamp) -> Rect {
    let max_x = (viewport.width - rect.width).max(0.0);
    let max_y = (viewport.height - rect.height).max(0.0);

    let (mut dx, mut dy) = (dx, dy);
    if policy == MoveClamp::Proportional {
        let clamped_dx = (rect.x + dx).clamp(0.0, max_x) - rect.x;
        if clamped_dx != dx && dx != 0.0 {
            dy *= clamped_dx / dx;
            dx = clamped_dx;
        }
        let clamped_dy = (rect.y + dy).clamp(0.0, max_y) - rect.y;
        if clamped_dy != dy && dy != 0.0 {
            dx *= clamped_dy / dy;
            dy = clamped_dy;
        }
    }

    Rect {
        x: (rect.x + dx).clamp(0.0, max_x),
        y: (rect.y + dy).clamp(0.0, max_y),
        ..*rect
    }
}

impl RegionSelector {
    /// Start a move or resize gesture on the finalized region.
    ///
    /// Returns `false` when the pointer is outside the region and its handles.
    pub(super) fn begin_edit(&mut self, p: Point, viewport: Viewport) -> bool {
        let Some(region) = self.region else {
            return false;
        };
        let p = viewport.clamp(p);

        match hit_test(&region.rect, p, self.handle_radius) {
            Some(Hit::Corner(corner)) => {
                // The grabbed corner becomes the live end point, so releasing
                // without moving restores the same rectangle.
                self.gesture = Some(Gesture::Draw {
                    anchor: region.rect.corner(corner.opposite()),
                    end: Some(region.rect.corner(corner)),
                });
                self.region = None;
                self.state = SelectionState::Selecting;
                log::debug!("Resize started from {:?}", corner);
                true
            }
            Some(Hit::Body) => {
                self.gesture = Some(Gesture::Move {
                    offset: Point::new(p.x - region.rect.x, p.y - region.rect.y),
                });
                log::debug!("Move started");
                true
            }
            None => false,
        }
    }

    /// Follow the pointer during a move gesture.
    pub(super) fn drag_region(&mut self, p: Point, offset: Point, viewport: Viewport) {
        let policy = self.move_clamp;
        if let Some(region) = self.region.as_mut() {
            let dx = p.x - offset.x - region.rect.x;
            let dy = p.y - offset.y - region.rect.y;
            region.rect = translate_clamped(&region.rect, dx, dy, viewport, policy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::SelectedRegion;
    use crate::util::geometry::SourceSize;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 450.0).unwrap()
    }

    fn source() -> SourceSize {
        SourceSize::new(1600, 900)
    }

    fn finalized(rect: Rect, policy: MoveClamp) -> RegionSelector {
        let mut selector = RegionSelector::new(policy, 8.0);
        selector.begin_selection();
        selector.pointer_down(rect.corner(Corner::TopLeft), viewport());
        selector.pointer_move(rect.corner(Corner::BottomRight), viewport());
        selector.pointer_up(rect.corner(Corner::BottomRight), viewport(), source());
        selector
    }

    fn assert_rect_close(a: &Rect, b: &Rect) {
        const EPS: f64 = 1e-9;
        assert!((a.x - b.x).abs() < EPS, "{:?} vs {:?}", a, b);
        assert!((a.y - b.y).abs() < EPS, "{:?} vs {:?}", a, b);
        assert!((a.width - b.width).abs() < EPS, "{:?} vs {:?}", a, b);
        assert!((a.height - b.height).abs() < EPS, "{:?} vs {:?}", a, b);
    }

    #[test]
    fn test_hit_test() {
        let rect = Rect::new(100.0, 100.0, 200.0, 150.0);

        assert_eq!(hit_test(&rect, Point::new(103.0, 97.0), 8.0), Some(Hit::Corner(Corner::TopLeft)));
        assert_eq!(hit_test(&rect, Point::new(300.0, 250.0), 8.0), Some(Hit::Corner(Corner::BottomRight)));
        assert_eq!(hit_test(&rect, Point::new(200.0, 200.0), 8.0), Some(Hit::Body));
        assert_eq!(hit_test(&rect, Point::new(50.0, 50.0), 8.0), None);
    }

    #[test]
    fn test_move_translates_region() {
        let mut selector = finalized(Rect::new(100.0, 100.0, 200.0, 150.0), MoveClamp::Independent);

        selector.pointer_down(Point::new(150.0, 150.0), viewport());
        selector.pointer_move(Point::new(180.0, 130.0), viewport());
        assert!(selector.pointer_up(Point::new(180.0, 130.0), viewport(), source()).is_none());

        let region = selector.region().unwrap();
        assert_eq!(region.rect, Rect::new(130.0, 80.0, 200.0, 150.0));
        // Moving keeps the scale factors from finalization
        assert_eq!(region.scale.x, 2.0);
        assert_eq!(selector.state(), SelectionState::Finalized);
        assert!(selector.gesture().is_none());
    }

    #[test]
    fn test_move_stays_in_bounds() {
        let mut selector = finalized(Rect::new(100.0, 100.0, 200.0, 150.0), MoveClamp::Independent);
        let vp = viewport();

        selector.pointer_down(Point::new(200.0, 200.0), vp);
        let path = [
            Point::new(-500.0, 200.0),
            Point::new(2000.0, -300.0),
            Point::new(900.0, 900.0),
            Point::new(-10.0, -10.0),
            Point::new(420.0, 260.0),
        ];
        for p in path {
            selector.pointer_move(p, vp);
            let r = selector.region().unwrap().rect;
            assert!(r.x >= 0.0 && r.x <= vp.width - r.width, "{:?}", r);
            assert!(r.y >= 0.0 && r.y <= vp.height - r.height, "{:?}", r);
            assert_eq!(r.width, 200.0);
            assert_eq!(r.height, 150.0);
        }
    }

    #[test]
    fn test_independent_clamp_keeps_free_axis() {
        let rect = Rect::new(10.0, 100.0, 100.0, 100.0);
        let moved = translate_clamped(&rect, -40.0, 20.0, viewport(), MoveClamp::Independent);
        assert_eq!(moved, Rect::new(0.0, 120.0, 100.0, 100.0));
    }

    #[test]
    fn test_proportional_clamp_scales_other_axis() {
        let rect = Rect::new(10.0, 100.0, 100.0, 100.0);
        // x can only move by -10 of the requested -40, so y moves a quarter
        let moved = translate_clamped(&rect, -40.0, 20.0, viewport(), MoveClamp::Proportional);
        assert_eq!(moved, Rect::new(0.0, 105.0, 100.0, 100.0));
    }

    #[test]
    fn test_proportional_move_stays_in_bounds() {
        let mut selector = finalized(Rect::new(300.0, 200.0, 100.0, 100.0), MoveClamp::Proportional);
        let vp = viewport();

        selector.pointer_down(Point::new(350.0, 250.0), vp);
        for p in [Point::new(-1000.0, 3000.0), Point::new(5000.0, 10.0), Point::new(351.0, -7.0)] {
            selector.pointer_move(p, vp);
            let r = selector.region().unwrap().rect;
            assert!(vp.contains_rect(&r), "{:?}", r);
        }
    }

    #[test]
    fn test_resize_round_trip_from_every_corner() {
        let original = Rect::new(100.0, 100.0, 200.0, 150.0);

        for corner in Corner::ALL {
            let mut selector = finalized(original, MoveClamp::Independent);
            let grab = original.corner(corner);

            selector.pointer_down(grab, viewport());
            assert_eq!(selector.state(), SelectionState::Selecting);

            let region = selector.pointer_up(grab, viewport(), source()).unwrap();
            assert_rect_close(&region.rect, &original);
            assert_eq!(selector.state(), SelectionState::Finalized);
        }
    }

    #[test]
    fn test_resize_follows_pointer() {
        let mut selector = finalized(Rect::new(100.0, 100.0, 200.0, 150.0), MoveClamp::Independent);

        // Grab the bottom-right handle and pull it past the top-left anchor
        selector.pointer_down(Point::new(300.0, 250.0), viewport());
        selector.pointer_move(Point::new(50.0, 60.0), viewport());
        let region: SelectedRegion = selector
            .pointer_up(Point::new(50.0, 60.0), viewport(), source())
            .unwrap();

        assert_eq!(region.rect, Rect::new(50.0, 60.0, 50.0, 40.0));
    }

    #[test]
    fn test_resize_refreshes_scale_factors() {
        let mut selector = finalized(Rect::new(100.0, 100.0, 200.0, 150.0), MoveClamp::Independent);
        let grab = Point::new(100.0, 100.0);

        selector.pointer_down(grab, viewport());
        let region = selector
            .pointer_up(grab, viewport(), SourceSize::new(2400, 900))
            .unwrap();

        assert_eq!(region.scale.x, 3.0);
        assert_eq!(region.scale.y, 2.0);
    }

    #[test]
    fn test_pointer_down_outside_region_does_nothing() {
        let mut selector = finalized(Rect::new(100.0, 100.0, 200.0, 150.0), MoveClamp::Independent);
        let before = *selector.region().unwrap();

        selector.pointer_down(Point::new(600.0, 400.0), viewport());
        selector.pointer_move(Point::new(700.0, 420.0), viewport());

        assert!(selector.gesture().is_none());
        assert_eq!(*selector.region().unwrap(), before);
    }
}
