// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Capture sources: screens, windows, microphones and system audio.
//!
//! The rest of the application only sees the [`CaptureProvider`],
//! [`VideoFeed`] and [`AudioTrack`] traits. [`SystemCaptureProvider`] is the
//! platform implementation.

pub mod audio;
pub mod screen;

use crate::util::geometry::SourceSize;
use image::RgbaImage;

pub use audio::{AudioDeviceTrack, AudioSource};
pub use screen::ScreenFeed;

/// Kind of a capturable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Monitor,
    Window,
}

/// Description of a source the user can pick.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub id: u32,
    pub kind: SourceKind,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl SourceInfo {
    pub fn label(&self) -> String {
        let kind = match self.kind {
            SourceKind::Monitor => "Screen",
            SourceKind::Window => "Window",
        };
        format!("{}: {} ({}x{})", kind, self.name, self.width, self.height)
    }
}

/// Errors raised while acquiring or reading capture sources.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture source unavailable: {0}")]
    Unavailable(String),

    #[error("Capture track has ended")]
    TrackEnded,
}

impl CaptureError {
    /// Classify a platform error message.
    ///
    /// Platforms report permission problems as plain strings, so this looks
    /// for the usual wording.
    pub fn from_platform(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized") {
            CaptureError::PermissionDenied(message)
        } else {
            CaptureError::Unavailable(message)
        }
    }
}

/// A live video feed.
pub trait VideoFeed {
    /// Resolution of the most recent frame (the nominal size before the
    /// first grab).
    fn size(&self) -> SourceSize;

    /// Capture the current frame.
    fn grab(&mut self) -> Result<RgbaImage, CaptureError>;

    fn is_live(&self) -> bool;

    /// Release the underlying capture handle. Idempotent.
    fn stop(&mut self);
}

/// A live audio feed producing interleaved f32 samples.
pub trait AudioTrack {
    fn label(&self) -> &str;

    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;

    /// Take every sample captured since the previous call.
    fn drain(&mut self) -> Vec<f32>;

    fn is_live(&self) -> bool;

    /// Release the underlying device. Idempotent.
    fn stop(&mut self);
}

/// Video plus optional source audio, as returned by a provider.
pub struct CaptureStream {
    pub info: SourceInfo,
    pub video: Box<dyn VideoFeed>,
    pub audio: Option<Box<dyn AudioTrack>>,
}

impl CaptureStream {
    /// Stop every track of the stream.
    pub fn stop(&mut self) {
        self.video.stop();
        if let Some(audio) = self.audio.as_mut() {
            audio.stop();
        }
    }
}

/// Source of capture feeds.
pub trait CaptureProvider {
    /// Enumerate the monitors and windows that can be captured.
    fn sources(&self) -> Result<Vec<SourceInfo>, CaptureError>;

    /// Open a live feed for the given source.
    fn open_source(&self, info: &SourceInfo) -> Result<CaptureStream, CaptureError>;

    /// Open the default microphone.
    fn open_microphone(&self) -> Result<Box<dyn AudioTrack>, CaptureError>;
}

/// Provider backed by the operating system.
#[derive(Debug, Default)]
pub struct SystemCaptureProvider;

impl CaptureProvider for SystemCaptureProvider {
    fn sources(&self) -> Result<Vec<SourceInfo>, CaptureError> {
        screen::enumerate_sources()
    }

    fn open_source(&self, info: &SourceInfo) -> Result<CaptureStream, CaptureError> {
        let feed = ScreenFeed::open(info)?;
        let audio = match AudioDeviceTrack::open(AudioSource::SystemAudio) {
            Ok(track) => Some(Box::new(track) as Box<dyn AudioTrack>),
            Err(e) => {
                log::info!("No system audio for {}: {}", info.name, e);
                None
            }
        };
        Ok(CaptureStream {
            info: info.clone(),
            video: Box::new(feed),
            audio,
        })
    }

    fn open_microphone(&self) -> Result<Box<dyn AudioTrack>, CaptureError> {
        Ok(Box::new(AudioDeviceTrack::open(AudioSource::Microphone)?))
    }
}
