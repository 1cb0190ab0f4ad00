// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live preview canvas with region overlay.
//!
//! This module draws the capture preview, the selected or in-progress
//! region and its handles, and turns mouse input into pointer events in
//! viewport coordinates.

use crate::models::editor::{hit_test, Hit};
use crate::models::region::{Corner, Point, Rect};
use crate::models::selection::{Gesture, RegionSelector, SelectionState};
use crate::util::geometry::{self, SourceSize, Viewport};

/// Pointer input in viewport coordinates (may lie outside the viewport).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

/// Raw pointer state for one UI frame, in viewport coordinates.
#[derive(Debug, Clone, Copy, Default)]
struct PointerInput {
    pressed: bool,
    released: bool,
    moved: bool,
    pos: Option<Point>,
    /// `pos` lies on the preview image.
    inside: bool,
}

/// Tracks a press that started on the preview, so that drags keep
/// reporting moves and the release even outside it.
#[derive(Debug, Default)]
pub struct PointerTracker {
    active: bool,
    last: Option<Point>,
}

impl PointerTracker {
    pub fn reset(&mut self) {
        self.active = false;
        self.last = None;
    }

    fn update(&mut self, input: PointerInput, events: &mut Vec<PointerEvent>) {
        if let Some(p) = input.pos {
            if input.pressed && input.inside {
                self.active = true;
                self.last = Some(p);
                events.push(PointerEvent::Down(p));
            } else if self.active && input.moved {
                self.last = Some(p);
                events.push(PointerEvent::Move(p));
            }
        }

        // The pointer may have left the window before the button came up.
        if self.active && input.released {
            if let Some(p) = input.pos.or(self.last) {
                events.push(PointerEvent::Up(p));
            }
            self.reset();
        }
    }
}

/// Result of canvas interaction.
#[derive(Debug, Default)]
pub struct CanvasOutput {
    /// Displayed preview size, when a preview is shown.
    pub viewport: Option<Viewport>,
    pub events: Vec<PointerEvent>,
}

/// Display the preview and collect pointer input.
pub fn show(
    ui: &mut egui::Ui,
    texture: &Option<egui::TextureHandle>,
    source_size: Option<SourceSize>,
    selector: &RegionSelector,
    recording: bool,
    tracker: &mut PointerTracker,
) -> CanvasOutput {
    let mut output = CanvasOutput::default();
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some(size)) = (texture, source_size) else {
            tracker.reset();
            show_welcome(ui);
            return;
        };

        let available = ui.available_size();
        let (display_width, display_height) =
            geometry::fit_size(size, available.x as f64, available.y as f64);
        let Some(viewport) = Viewport::new(display_width, display_height) else {
            return;
        };
        output.viewport = Some(viewport);

        // Center the preview
        let x_offset = (available.x - display_width as f32) / 2.0;
        let y_offset = (available.y - display_height as f32) / 2.0;
        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min + egui::vec2(x_offset, y_offset),
            egui::vec2(display_width as f32, display_height as f32),
        );

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
        let to_viewport = |p: egui::Pos2| {
            Point::new((p.x - image_rect.min.x) as f64, (p.y - image_rect.min.y) as f64)
        };

        if !recording {
            let input = ui.input(|i| {
                let pos = i.pointer.interact_pos().or_else(|| i.pointer.latest_pos());
                PointerInput {
                    pressed: i.pointer.primary_pressed(),
                    released: i.pointer.primary_released(),
                    moved: i.pointer.delta() != egui::Vec2::ZERO,
                    pos: pos.map(to_viewport),
                    inside: pos.is_some_and(|p| image_rect.contains(p)),
                }
            });
            tracker.update(input, &mut output.events);

            if let Some(hover) = response.hover_pos() {
                set_cursor(ui, selector, to_viewport(hover));
            }
        } else {
            tracker.reset();
        }

        draw_overlay(ui.painter(), selector, &image_rect, recording);
    });

    // Status line at the bottom
    ui.separator();
    ui.horizontal(|ui| {
        let state = match selector.state() {
            SelectionState::Idle => "No region",
            SelectionState::Selecting => "Drag on the preview to select a region",
            SelectionState::Finalized => "Drag the region to move it, or a corner to resize",
        };
        ui.label(state);
        if recording {
            ui.separator();
            ui.label(egui::RichText::new("● REC").color(egui::Color32::RED));
        }
    });

    output
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Crop Recorder")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Record a screen, a window, or just part of one")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Pick a source in the toolbar to begin")
                    .color(egui::Color32::from_gray(180)),
            );
        });
    });
}

fn set_cursor(ui: &egui::Ui, selector: &RegionSelector, p: Point) {
    if let Some(Gesture::Move { .. }) = selector.gesture() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        return;
    }
    let icon = match selector.state() {
        SelectionState::Selecting => egui::CursorIcon::Crosshair,
        SelectionState::Finalized => {
            let hit = selector
                .region()
                .and_then(|r| hit_test(&r.rect, p, selector.handle_radius()));
            match hit {
                Some(Hit::Corner(Corner::TopLeft | Corner::BottomRight)) => egui::CursorIcon::ResizeNwSe,
                Some(Hit::Corner(Corner::TopRight | Corner::BottomLeft)) => egui::CursorIcon::ResizeNeSw,
                Some(Hit::Body) => egui::CursorIcon::Move,
                None => return,
            }
        }
        SelectionState::Idle => return,
    };
    ui.ctx().set_cursor_icon(icon);
}

/// Convert a viewport rectangle to screen coordinates.
fn to_screen(rect: &Rect, image_rect: &egui::Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        image_rect.min + egui::vec2(rect.x as f32, rect.y as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

/// Draw the selected region (dimming everything outside it) or the
/// rectangle being dragged.
fn draw_overlay(painter: &egui::Painter, selector: &RegionSelector, image_rect: &egui::Rect, recording: bool) {
    if let Some(live) = selector.live_rect() {
        let rect = to_screen(&live, image_rect);
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE));
        return;
    }

    let Some(region) = selector.region() else {
        return;
    };
    let rect = to_screen(&region.rect, image_rect);
    let shade = egui::Color32::from_black_alpha(140);

    // Dim the four bands around the region
    let bands = [
        egui::Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, rect.min.y)),
        egui::Rect::from_min_max(egui::pos2(image_rect.min.x, rect.max.y), image_rect.max),
        egui::Rect::from_min_max(egui::pos2(image_rect.min.x, rect.min.y), egui::pos2(rect.min.x, rect.max.y)),
        egui::Rect::from_min_max(egui::pos2(rect.max.x, rect.min.y), egui::pos2(image_rect.max.x, rect.max.y)),
    ];
    for band in bands {
        if band.is_positive() {
            painter.rect_filled(band, 0.0, shade);
        }
    }

    let color = if recording {
        egui::Color32::RED
    } else {
        egui::Color32::YELLOW
    };
    painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, color));

    if !recording {
        let handle = selector.handle_radius() as f32;
        for corner in Corner::ALL {
            let c = region.rect.corner(corner);
            let center = image_rect.min + egui::vec2(c.x as f32, c.y as f32);
            let square = egui::Rect::from_center_size(center, egui::vec2(handle, handle));
            painter.rect_filled(square, 0.0, egui::Color32::WHITE);
            painter.rect_stroke(square, 0.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
        }
    }
}
