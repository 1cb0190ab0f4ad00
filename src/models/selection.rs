// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven region selection.
//!
//! The selector is a small state machine (`Idle -> Selecting -> Finalized`)
//! fed with pointer down/move/up events in viewport coordinates. Per-gesture
//! state lives in a single optional [`Gesture`] that is cleared at the end of
//! every gesture, so the selector's behavior is fully determined by its
//! state and that value.

use super::editor::MoveClamp;
use super::region::{Point, Rect, SelectedRegion};
use crate::util::geometry::{self, SourceSize, Viewport};

/// Where the selector is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No selection in progress and no region.
    Idle,
    /// Waiting for, or in the middle of, a drag that draws a region.
    Selecting,
    /// A region exists and can be moved or resized.
    Finalized,
}

/// Transient state of the gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Drawing a rectangle from `anchor`; `end` follows the pointer.
    Draw { anchor: Point, end: Option<Point> },
    /// Dragging the finalized region; `offset` is pointer minus region origin.
    Move { offset: Point },
}

/// Region selector and editor state.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    pub(super) state: SelectionState,
    pub(super) region: Option<SelectedRegion>,
    pub(super) gesture: Option<Gesture>,
    pub(super) move_clamp: MoveClamp,
    pub(super) handle_radius: f64,
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new(MoveClamp::default(), 8.0)
    }
}

impl RegionSelector {
    pub fn new(move_clamp: MoveClamp, handle_radius: f64) -> Self {
        Self {
            state: SelectionState::Idle,
            region: None,
            gesture: None,
            move_clamp,
            handle_radius,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn region(&self) -> Option<&SelectedRegion> {
        self.region.as_ref()
    }

    pub fn gesture(&self) -> Option<Gesture> {
        self.gesture
    }

    pub fn handle_radius(&self) -> f64 {
        self.handle_radius
    }

    pub fn set_move_clamp(&mut self, move_clamp: MoveClamp) {
        self.move_clamp = move_clamp;
    }

    /// The rectangle being drawn, normalized, for preview rendering.
    pub fn live_rect(&self) -> Option<Rect> {
        match self.gesture {
            Some(Gesture::Draw {
                anchor,
                end: Some(end),
            }) => Some(Rect::from_corners(anchor, end)),
            _ => None,
        }
    }

    /// Enter `Selecting`, discarding any finalized region and gesture.
    pub fn begin_selection(&mut self) {
        self.state = SelectionState::Selecting;
        self.region = None;
        self.gesture = None;
        log::debug!("Region selection started");
    }

    /// Return to `Idle` and forget the region. Used when the source changes.
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
        self.region = None;
        self.gesture = None;
    }

    /// Remove the current region, if any.
    pub fn clear_region(&mut self) {
        if self.region.is_some() {
            log::info!("Region cleared");
        }
        self.reset();
    }

    pub fn pointer_down(&mut self, p: Point, viewport: Viewport) {
        match self.state {
            SelectionState::Selecting if self.gesture.is_none() => {
                self.gesture = Some(Gesture::Draw {
                    anchor: viewport.clamp(p),
                    end: None,
                });
            }
            SelectionState::Finalized if self.gesture.is_none() => {
                self.begin_edit(p, viewport);
            }
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, p: Point, viewport: Viewport) {
        match self.gesture {
            Some(Gesture::Draw { anchor, .. }) => {
                self.gesture = Some(Gesture::Draw {
                    anchor,
                    end: Some(viewport.clamp(p)),
                });
            }
            Some(Gesture::Move { offset }) => self.drag_region(p, offset, viewport),
            None => {}
        }
    }

    /// Finish the current gesture.
    ///
    /// Returns the newly finalized region when a draw (or resize) gesture
    /// ends. A release without any prior move uses the release position as
    /// the end point, which yields a zero-area region for a plain click.
    pub fn pointer_up(
        &mut self,
        p: Point,
        viewport: Viewport,
        source: SourceSize,
    ) -> Option<SelectedRegion> {
        match self.gesture.take()? {
            Gesture::Draw { anchor, end } => {
                let end = end.unwrap_or_else(|| viewport.clamp(p));
                let region = SelectedRegion::new(
                    Rect::from_corners(anchor, end),
                    geometry::scale_factors(source, viewport),
                );
                self.region = Some(region);
                self.state = SelectionState::Finalized;
                log::info!(
                    "Region finalized at ({:.1}, {:.1}) {:.1}x{:.1}, scale {:.3}x{:.3}",
                    region.rect.x,
                    region.rect.y,
                    region.rect.width,
                    region.rect.height,
                    region.scale.x,
                    region.scale.y
                );
                Some(region)
            }
            Gesture::Move { .. } => None,
        }
    }

    /// Keep the region consistent with a resized preview.
    ///
    /// The region's source rectangle is preserved: its viewport rectangle is
    /// recomputed from fresh scale factors and clamped into the new bounds.
    pub fn fit_to_viewport(&mut self, viewport: Viewport, source: SourceSize) {
        let Some(region) = self.region.as_mut() else {
            return;
        };
        let scale = geometry::scale_factors(source, viewport);
        if scale == region.scale && viewport.contains_rect(&region.rect) {
            return;
        }

        let src = region.source_rect();
        let mut rect = geometry::to_viewport_rect(&src, scale);
        rect.width = rect.width.min(viewport.width);
        rect.height = rect.height.min(viewport.height);
        rect.x = rect.x.clamp(0.0, viewport.width - rect.width);
        rect.y = rect.y.clamp(0.0, viewport.height - rect.height);

        // A move in progress keeps grabbing the same source point.
        if let Some(Gesture::Move { offset }) = self.gesture {
            self.gesture = Some(Gesture::Move {
                offset: Point::new(
                    offset.x * region.scale.x / scale.x,
                    offset.y * region.scale.y / scale.y,
                ),
            });
        }

        region.rect = rect;
        region.scale = scale;
    }
}
