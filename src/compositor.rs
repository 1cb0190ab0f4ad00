// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Cropped capture compositor.
//!
//! When a region is selected, the compositor keeps an off-screen RGBA
//! surface the size of the region in source pixels and copies that part of
//! every live source frame into it. The surface then stands in for the
//! source's video track while recording.

use crate::models::region::SelectedRegion;
use crate::util::geometry::{self, PixelRect};
use image::RgbaImage;
use std::time::{Duration, Instant};

/// Limits how often frames are produced.
#[derive(Debug, Clone)]
pub struct FramePacer {
    min_interval: Option<Duration>,
    last: Option<Instant>,
}

impl FramePacer {
    /// `None` (or zero) runs at whatever cadence ticks arrive.
    pub fn new(frame_rate_cap: Option<u32>) -> Self {
        let min_interval = frame_rate_cap
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / fps as f64));
        Self {
            min_interval,
            last: None,
        }
    }

    /// Whether a frame is due at `now`; marks it produced if so.
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match (self.min_interval, self.last) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        };
        if due {
            self.last = Some(now);
        }
        due
    }
}

/// Result of one compositor tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The surface was redrawn.
    Drawn,
    /// The frame-rate cap suppressed this tick.
    Skipped,
    /// The compositor has stopped; nothing more will be drawn.
    Stopped,
}

/// Off-screen surface fed from a cropped part of the source.
#[derive(Debug)]
pub struct CroppedCompositor {
    crop: PixelRect,
    surface: RgbaImage,
    pacer: FramePacer,
    stopped: bool,
    frames_drawn: u64,
}

impl CroppedCompositor {
    /// Build a compositor for the region.
    ///
    /// Returns `None` when the region has no area once mapped onto the
    /// source pixel grid; callers then record the source unmodified.
    pub fn new(region: &SelectedRegion, frame_rate_cap: Option<u32>) -> Option<Self> {
        let crop = geometry::to_pixel_rect(&region.source_rect());
        if crop.is_empty() {
            return None;
        }

        log::info!(
            "Compositor surface {}x{} from source ({}, {})",
            crop.width,
            crop.height,
            crop.x,
            crop.y
        );

        Some(Self {
            crop,
            surface: RgbaImage::new(crop.width, crop.height),
            pacer: FramePacer::new(frame_rate_cap),
            stopped: false,
            frames_drawn: 0,
        })
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    pub fn crop_rect(&self) -> PixelRect {
        self.crop
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Stop drawing for good, e.g. after the source track ended.
    pub fn stop(&mut self) {
        if !self.stopped {
            log::info!("Compositor stopped after {} frames", self.frames_drawn);
        }
        self.stopped = true;
    }

    /// Redraw the surface from `frame` if a frame is due.
    pub fn tick(&mut self, now: Instant, frame: &RgbaImage) -> Tick {
        if self.stopped {
            return Tick::Stopped;
        }
        if !self.pacer.ready(now) {
            return Tick::Skipped;
        }
        self.draw(frame);
        self.frames_drawn += 1;
        Tick::Drawn
    }

    /// Copy the crop rectangle of `frame` to the surface origin, unscaled.
    ///
    /// Any part of the rectangle outside the frame leaves the surface as is.
    fn draw(&mut self, frame: &RgbaImage) {
        let c = self.crop;
        if c.x >= frame.width() || c.y >= frame.height() {
            return;
        }
        let row_bytes = c.width.min(frame.width() - c.x) as usize * 4;
        let rows = c.height.min(frame.height() - c.y) as usize;

        let src = frame.as_raw();
        let src_stride = frame.width() as usize * 4;
        let dst_stride = self.surface.width() as usize * 4;
        let dst: &mut [u8] = &mut self.surface;

        for row in 0..rows {
            let s = (c.y as usize + row) * src_stride + c.x as usize * 4;
            let d = row * dst_stride;
            dst[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
        }
    }
}
