// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recording studio state.
//!
//! [`Studio`] owns the current capture source, the region selector, the
//! running recording and the last finished recording. Every user command
//! goes through it, and every failure leaves it in a well-defined state
//! with a [`Notice`] for the UI. All of it runs on the UI thread: commands
//! and [`Studio::tick`] are called synchronously from the frame callback.

use crate::capture::{AudioTrack, CaptureError, CaptureProvider, CaptureStream, SourceInfo};
use crate::config::Config;
use crate::models::editor::MoveClamp;
use crate::models::region::{Point, SelectedRegion};
use crate::models::selection::RegionSelector;
use crate::recording::{MediaSession, RecordedMedia, RecorderSink, RecordingError, VideoTrack};
use crate::util::geometry::{SourceSize, Viewport};
use image::RgbaImage;
use std::time::Instant;

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message shown to the user until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Errors from studio commands.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("Please select a screen or window first")]
    NoSource,

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("No such source")]
    UnknownSource,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Recording failed: {0}")]
    Recording(#[from] RecordingError),
}

impl StudioError {
    fn notice_level(&self) -> NoticeLevel {
        match self {
            StudioError::NoSource
            | StudioError::AlreadyRecording
            | StudioError::NotRecording
            | StudioError::UnknownSource => NoticeLevel::Warning,
            StudioError::Capture(_) | StudioError::Recording(_) => NoticeLevel::Error,
        }
    }
}

/// Creates a fresh sink for every recording.
pub type SinkFactory = Box<dyn Fn(&Config) -> Box<dyn RecorderSink>>;

pub struct Studio {
    provider: Box<dyn CaptureProvider>,
    sink_factory: SinkFactory,
    config: Config,
    sources: Vec<SourceInfo>,
    stream: Option<CaptureStream>,
    selector: RegionSelector,
    viewport: Option<Viewport>,
    session: Option<MediaSession>,
    recorded: Option<RecordedMedia>,
    notice: Option<Notice>,
}

impl Studio {
    pub fn new(provider: Box<dyn CaptureProvider>, sink_factory: SinkFactory, config: Config) -> Self {
        let selector = RegionSelector::new(config.move_clamp, config.handle_radius as f64);
        Self {
            provider,
            sink_factory,
            config,
            sources: Vec::new(),
            stream: None,
            selector,
            viewport: None,
            session: None,
            recorded: None,
            notice: None,
        }
    }

    // ----- accessors -----

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    pub fn source(&self) -> Option<&SourceInfo> {
        self.stream.as_ref().map(|s| &s.info)
    }

    /// Actual resolution of the live source.
    pub fn source_size(&self) -> Option<SourceSize> {
        self.stream.as_ref().map(|s| s.video.size())
    }

    pub fn has_live_source(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.video.is_live())
    }

    pub fn selector(&self) -> &RegionSelector {
        &self.selector
    }

    pub fn region(&self) -> Option<&SelectedRegion> {
        self.selector.region()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&MediaSession> {
        self.session.as_ref()
    }

    pub fn recorded(&self) -> Option<&RecordedMedia> {
        self.recorded.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Show a notice raised outside the studio, e.g. by a failed save.
    pub fn post_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    // ----- settings -----

    pub fn set_frame_rate_cap(&mut self, cap: Option<u32>) {
        self.config.frame_rate_cap = cap.filter(|&fps| fps > 0);
    }

    pub fn set_include_microphone(&mut self, include: bool) {
        self.config.include_microphone = include;
    }

    pub fn set_include_system_audio(&mut self, include: bool) {
        self.config.include_system_audio = include;
    }

    pub fn set_move_clamp(&mut self, move_clamp: MoveClamp) {
        self.config.move_clamp = move_clamp;
        self.selector.set_move_clamp(move_clamp);
    }

    // ----- error reporting -----

    fn report(&mut self, error: StudioError) -> StudioError {
        match error.notice_level() {
            NoticeLevel::Error => log::error!("{}", error),
            _ => log::warn!("{}", error),
        }
        self.notice = Some(Notice {
            level: error.notice_level(),
            message: error.to_string(),
        });
        error
    }

    // ----- sources -----

    pub fn refresh_sources(&mut self) -> Result<(), StudioError> {
        match self.provider.sources() {
            Ok(sources) => {
                log::info!("Found {} capture sources", sources.len());
                self.sources = sources;
                Ok(())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Switch to the source at `index` of [`Studio::sources`].
    ///
    /// The previous source is released first and any region is discarded.
    pub fn select_source(&mut self, index: usize) -> Result<(), StudioError> {
        if self.session.is_some() {
            return Err(self.report(StudioError::AlreadyRecording));
        }
        let Some(info) = self.sources.get(index).cloned() else {
            return Err(self.report(StudioError::UnknownSource));
        };

        self.release_source();

        match self.provider.open_source(&info) {
            Ok(stream) => {
                log::info!("Selected source {}", info.label());
                self.stream = Some(stream);
                self.notice = None;
                Ok(())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Stop the current source and forget its region.
    fn release_source(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            log::info!("Released source {}", stream.info.label());
        }
        self.selector.reset();
    }

    // ----- region -----

    pub fn begin_region_selection(&mut self) -> Result<(), StudioError> {
        if self.stream.is_none() {
            return Err(self.report(StudioError::NoSource));
        }
        if self.session.is_some() {
            return Err(self.report(StudioError::AlreadyRecording));
        }
        self.selector.begin_selection();
        Ok(())
    }

    pub fn clear_region(&mut self) {
        if self.session.is_none() {
            self.selector.clear_region();
        }
    }

    /// Record the current preview size, rescaling the region if it changed.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        if self.session.is_none() {
            if let Some(source) = self.source_size() {
                self.selector.fit_to_viewport(viewport, source);
            }
        }
    }

    /// Pointer input is ignored while recording: the crop is fixed for the
    /// length of a recording.
    fn editable_viewport(&self) -> Option<Viewport> {
        match (&self.stream, &self.session) {
            (Some(_), None) => self.viewport,
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, p: Point) {
        if let Some(viewport) = self.editable_viewport() {
            self.selector.pointer_down(p, viewport);
        }
    }

    pub fn pointer_move(&mut self, p: Point) {
        if let Some(viewport) = self.editable_viewport() {
            self.selector.pointer_move(p, viewport);
        }
    }

    pub fn pointer_up(&mut self, p: Point) {
        let (Some(viewport), Some(source)) = (self.editable_viewport(), self.source_size()) else {
            return;
        };
        self.selector.pointer_up(p, viewport, source);
    }

    // ----- recording -----

    /// Start recording the current source, cropped if a region is selected.
    ///
    /// Nothing changes when this fails: the source stays live so the user
    /// can try again.
    pub fn start_recording(&mut self) -> Result<(), StudioError> {
        if self.session.is_some() {
            return Err(self.report(StudioError::AlreadyRecording));
        }
        if !self.has_live_source() {
            return Err(self.report(StudioError::NoSource));
        }

        let mut audio: Vec<Box<dyn AudioTrack>> = Vec::new();
        if self.config.include_microphone {
            match self.provider.open_microphone() {
                Ok(mic) => audio.push(mic),
                Err(e) => return Err(self.report(e.into())),
            }
        }

        let Some(stream) = self.stream.as_mut() else {
            return Err(self.report(StudioError::NoSource));
        };
        if self.config.include_system_audio {
            if let Some(source_audio) = stream.audio.take() {
                audio.insert(0, source_audio);
            }
        }
        let source = stream.video.size();

        let video = VideoTrack::for_region(self.selector.region(), self.config.frame_rate_cap);
        let sink = (self.sink_factory)(&self.config);

        match MediaSession::start(video, audio, sink, source) {
            Ok(session) => {
                self.session = Some(session);
                self.notice = None;
                Ok(())
            }
            Err(e) => {
                // The source's own audio went down with the failed session.
                self.release_source();
                Err(self.report(e.into()))
            }
        }
    }

    /// Stop recording, keep the result, and release every capture handle.
    pub fn stop_recording(&mut self) -> Result<(), StudioError> {
        let Some(session) = self.session.take() else {
            return Err(self.report(StudioError::NotRecording));
        };
        let result = session.finish();
        self.release_source();

        match result {
            Ok(media) => {
                self.notice = Some(Notice::info(format!(
                    "Recorded {} frames ({:.1}s). Use Download to save.",
                    media.frames,
                    media.duration.as_secs_f64()
                )));
                self.recorded = Some(media);
                Ok(())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Advance one UI frame.
    ///
    /// Grabs a source frame for the preview and, while recording, feeds it
    /// to the session. Returns the frame, or `None` without a live source.
    pub fn tick(&mut self, now: Instant) -> Option<RgbaImage> {
        let grabbed = self.stream.as_mut()?.video.grab();

        match grabbed {
            Ok(frame) => {
                if let Some(session) = self.session.as_mut() {
                    if let Err(e) = session.push(now, &frame) {
                        self.abort_recording(e.into());
                    }
                }
                Some(frame)
            }
            Err(CaptureError::TrackEnded) => {
                self.handle_source_lost();
                None
            }
            Err(e) => {
                let error = self.report(e.into());
                log::debug!("Frame skipped: {}", error);
                None
            }
        }
    }

    /// The source went away: stop cleanly, keeping whatever was recorded.
    fn handle_source_lost(&mut self) {
        let message = match self.session.take() {
            Some(session) => {
                // Finishing stops the compositor before anything else is drawn.
                match session.finish() {
                    Ok(media) => {
                        self.recorded = Some(media);
                        "The capture source ended. The recording was stopped and can be downloaded."
                    }
                    Err(e) => {
                        log::error!("Failed to finish recording: {}", e);
                        "The capture source ended and the recording could not be saved."
                    }
                }
            }
            None => "The capture source ended. Select a source to continue.",
        };
        log::warn!("{}", message);
        self.release_source();
        self.notice = Some(Notice {
            level: NoticeLevel::Warning,
            message: message.to_string(),
        });
    }

    /// A sink write failed mid-recording: drop the recording and the source.
    fn abort_recording(&mut self, error: StudioError) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.finish() {
                log::warn!("Discarding partial recording: {}", e);
            }
        }
        self.release_source();
        self.report(error);
    }
}
