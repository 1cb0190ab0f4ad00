// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Screen and window feeds using the `xcap` crate.
//!
//! Each grab captures the monitor or window afresh. A failed grab means the
//! source went away, and the feed reports itself as ended from then on.

use super::{CaptureError, SourceInfo, SourceKind, VideoFeed};
use crate::util::geometry::SourceSize;
use image::RgbaImage;
use xcap::{Monitor, Window};

/// List the monitors and visible, titled windows.
pub fn enumerate_sources() -> Result<Vec<SourceInfo>, CaptureError> {
    let monitors = Monitor::all()
        .map_err(|e| CaptureError::from_platform(format!("Failed to get monitors: {}", e)))?;

    let mut sources: Vec<SourceInfo> = monitors
        .iter()
        .enumerate()
        .map(|(idx, monitor)| SourceInfo {
            id: idx as u32,
            kind: SourceKind::Monitor,
            name: monitor
                .name()
                .unwrap_or_else(|_| format!("Monitor {}", idx)),
            width: monitor.width().unwrap_or(0),
            height: monitor.height().unwrap_or(0),
        })
        .collect();

    // Window enumeration can fail on its own (e.g. missing permission) without
    // making monitors unusable.
    match Window::all() {
        Ok(windows) => sources.extend(
            windows
                .iter()
                .filter(|w| !w.is_minimized().unwrap_or(true))
                .map(|w| SourceInfo {
                    id: w.id().unwrap_or(0),
                    kind: SourceKind::Window,
                    name: w.title().unwrap_or_default(),
                    width: w.width().unwrap_or(0),
                    height: w.height().unwrap_or(0),
                })
                .filter(|s| !s.name.is_empty() && s.width > 0 && s.height > 0),
        ),
        Err(e) => log::warn!("Failed to get windows: {}", e),
    }

    Ok(sources)
}

enum Target {
    Monitor(Monitor),
    Window(Window),
}

/// Live feed of a single monitor or window.
pub struct ScreenFeed {
    target: Option<Target>,
    size: SourceSize,
}

impl ScreenFeed {
    /// Look up the source again and take a first frame to prove it is
    /// capturable.
    pub fn open(info: &SourceInfo) -> Result<Self, CaptureError> {
        let target = match info.kind {
            SourceKind::Monitor => {
                let monitors = Monitor::all()
                    .map_err(|e| CaptureError::from_platform(format!("Failed to get monitors: {}", e)))?;
                monitors
                    .into_iter()
                    .nth(info.id as usize)
                    .map(Target::Monitor)
                    .ok_or_else(|| CaptureError::Unavailable(format!("Monitor {} not found", info.name)))?
            }
            SourceKind::Window => {
                let windows = Window::all()
                    .map_err(|e| CaptureError::from_platform(format!("Failed to get windows: {}", e)))?;
                windows
                    .into_iter()
                    .find(|w| w.id().map(|id| id == info.id).unwrap_or(false))
                    .map(Target::Window)
                    .ok_or_else(|| CaptureError::Unavailable(format!("Window '{}' not found", info.name)))?
            }
        };

        let mut feed = Self {
            target: Some(target),
            size: SourceSize::new(info.width, info.height),
        };
        let first = feed.capture().map_err(CaptureError::from_platform)?;
        feed.size = SourceSize::new(first.width(), first.height());
        log::info!(
            "Opened {} ({}x{} actual)",
            info.label(),
            feed.size.width,
            feed.size.height
        );
        Ok(feed)
    }

    fn capture(&self) -> Result<RgbaImage, String> {
        match &self.target {
            Some(Target::Monitor(m)) => m.capture_image().map_err(|e| e.to_string()),
            Some(Target::Window(w)) => w.capture_image().map_err(|e| e.to_string()),
            None => Err("feed stopped".to_string()),
        }
    }
}

impl VideoFeed for ScreenFeed {
    fn size(&self) -> SourceSize {
        self.size
    }

    fn grab(&mut self) -> Result<RgbaImage, CaptureError> {
        if self.target.is_none() {
            return Err(CaptureError::TrackEnded);
        }
        match self.capture() {
            Ok(frame) => {
                self.size = SourceSize::new(frame.width(), frame.height());
                Ok(frame)
            }
            Err(e) => {
                log::warn!("Capture failed, ending track: {}", e);
                self.target = None;
                Err(CaptureError::TrackEnded)
            }
        }
    }

    fn is_live(&self) -> bool {
        self.target.is_some()
    }

    fn stop(&mut self) {
        if self.target.take().is_some() {
            log::info!("Screen feed stopped");
        }
    }
}
