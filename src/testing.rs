// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory capture sources and sinks for unit tests.

use crate::capture::{AudioTrack, CaptureError, CaptureProvider, CaptureStream, SourceInfo, SourceKind, VideoFeed};
use crate::recording::{AudioFormat, RecordedMedia, RecorderSink, RecordingError};
use crate::util::geometry::SourceSize;
use image::RgbaImage;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct FeedState {
    pub ended: bool,
    pub stopped: bool,
    pub grabs: u32,
}

/// Shared view of a [`FakeFeed`].
#[derive(Debug, Clone, Default)]
pub struct FeedHandle(Rc<RefCell<FeedState>>);

impl FeedHandle {
    /// Make the next grab fail as if the window was closed.
    pub fn end(&self) {
        self.0.borrow_mut().ended = true;
    }

    pub fn stopped(&self) -> bool {
        self.0.borrow().stopped
    }

    pub fn grabs(&self) -> u32 {
        self.0.borrow().grabs
    }
}

/// Video feed producing solid frames of a fixed size.
pub struct FakeFeed {
    size: SourceSize,
    state: FeedHandle,
}

impl FakeFeed {
    pub fn new(width: u32, height: u32) -> (Self, FeedHandle) {
        let handle = FeedHandle::default();
        (
            Self {
                size: SourceSize::new(width, height),
                state: handle.clone(),
            },
            handle,
        )
    }
}

impl VideoFeed for FakeFeed {
    fn size(&self) -> SourceSize {
        self.size
    }

    fn grab(&mut self) -> Result<RgbaImage, CaptureError> {
        let mut state = self.state.0.borrow_mut();
        if state.ended || state.stopped {
            return Err(CaptureError::TrackEnded);
        }
        state.grabs += 1;
        Ok(RgbaImage::from_pixel(
            self.size.width,
            self.size.height,
            image::Rgba([10, 20, 30, 255]),
        ))
    }

    fn is_live(&self) -> bool {
        let state = self.state.0.borrow();
        !state.ended && !state.stopped
    }

    fn stop(&mut self) {
        self.state.0.borrow_mut().stopped = true;
    }
}

#[derive(Debug, Default)]
pub struct AudioState {
    pub pending: Vec<f32>,
    pub stopped: bool,
}

/// Shared view of a [`FakeAudio`].
#[derive(Debug, Clone, Default)]
pub struct AudioHandle(Rc<RefCell<AudioState>>);

impl AudioHandle {
    pub fn push(&self, samples: &[f32]) {
        self.0.borrow_mut().pending.extend_from_slice(samples);
    }

    pub fn stopped(&self) -> bool {
        self.0.borrow().stopped
    }
}

/// Mono 48 kHz audio track fed by the test.
pub struct FakeAudio {
    label: String,
    state: AudioHandle,
}

impl FakeAudio {
    pub fn new(label: &str) -> (Self, AudioHandle) {
        let handle = AudioHandle::default();
        (
            Self {
                label: label.to_string(),
                state: handle.clone(),
            },
            handle,
        )
    }
}

impl AudioTrack for FakeAudio {
    fn label(&self) -> &str {
        &self.label
    }

    fn sample_rate(&self) -> u32 {
        48_000
    }

    fn channels(&self) -> u16 {
        1
    }

    fn drain(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.state.0.borrow_mut().pending)
    }

    fn is_live(&self) -> bool {
        !self.state.0.borrow().stopped
    }

    fn stop(&mut self) {
        self.state.0.borrow_mut().stopped = true;
    }
}

#[derive(Default)]
pub struct ProviderState {
    pub deny_microphone: bool,
    pub fail_sources: bool,
    /// Opened sources come with a "system-audio" track.
    pub source_audio: bool,
    pub feeds: Vec<FeedHandle>,
    pub microphones: Vec<AudioHandle>,
    pub source_audio_tracks: Vec<AudioHandle>,
}

/// Provider handing out [`FakeFeed`]s and [`FakeAudio`] microphones.
pub struct FakeProvider {
    sources: Vec<SourceInfo>,
    state: Rc<RefCell<ProviderState>>,
}

impl FakeProvider {
    pub fn new() -> (Self, Rc<RefCell<ProviderState>>) {
        let state = Rc::new(RefCell::new(ProviderState::default()));
        let sources = vec![
            SourceInfo {
                id: 0,
                kind: SourceKind::Monitor,
                name: "Built-in Display".to_string(),
                width: 1600,
                height: 900,
            },
            SourceInfo {
                id: 42,
                kind: SourceKind::Window,
                name: "Editor".to_string(),
                width: 800,
                height: 600,
            },
        ];
        (
            Self {
                sources,
                state: state.clone(),
            },
            state,
        )
    }
}

impl CaptureProvider for FakeProvider {
    fn sources(&self) -> Result<Vec<SourceInfo>, CaptureError> {
        Ok(self.sources.clone())
    }

    fn open_source(&self, info: &SourceInfo) -> Result<CaptureStream, CaptureError> {
        let mut state = self.state.borrow_mut();
        if state.fail_sources {
            return Err(CaptureError::PermissionDenied("screen sharing was denied".to_string()));
        }
        let (feed, handle) = FakeFeed::new(info.width, info.height);
        state.feeds.push(handle);
        let audio = if state.source_audio {
            let (audio, handle) = FakeAudio::new("system-audio");
            state.source_audio_tracks.push(handle);
            Some(Box::new(audio) as Box<dyn AudioTrack>)
        } else {
            None
        };
        Ok(CaptureStream {
            info: info.clone(),
            video: Box::new(feed),
            audio,
        })
    }

    fn open_microphone(&self) -> Result<Box<dyn AudioTrack>, CaptureError> {
        let mut state = self.state.borrow_mut();
        if state.deny_microphone {
            return Err(CaptureError::PermissionDenied("microphone access was denied".to_string()));
        }
        let (audio, handle) = FakeAudio::new("microphone");
        state.microphones.push(handle);
        Ok(Box::new(audio))
    }
}

#[derive(Debug, Default)]
pub struct SinkLog {
    pub begun: Option<(u32, u32)>,
    pub audio_formats: Vec<AudioFormat>,
    pub frame_sizes: Vec<(u32, u32)>,
    pub audio_samples: Vec<Vec<f32>>,
    pub finished: bool,
}

/// Sink that records what it was given.
pub struct MemorySink {
    log: Rc<RefCell<SinkLog>>,
    pub fail_begin: bool,
}

impl MemorySink {
    pub fn new() -> (Self, Rc<RefCell<SinkLog>>) {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        (
            Self {
                log: log.clone(),
                fail_begin: false,
            },
            log,
        )
    }
}

impl RecorderSink for MemorySink {
    fn begin(&mut self, width: u32, height: u32, audio: &[AudioFormat]) -> Result<(), RecordingError> {
        if self.fail_begin {
            return Err(RecordingError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "staging directory is read-only",
            )));
        }
        let mut log = self.log.borrow_mut();
        log.begun = Some((width, height));
        log.audio_formats = audio.to_vec();
        log.audio_samples = vec![Vec::new(); audio.len()];
        Ok(())
    }

    fn write_frame(&mut self, frame: &RgbaImage, _at: Instant) -> Result<(), RecordingError> {
        self.log.borrow_mut().frame_sizes.push(frame.dimensions());
        Ok(())
    }

    fn write_audio(&mut self, track: usize, samples: &[f32]) -> Result<(), RecordingError> {
        let mut log = self.log.borrow_mut();
        let buffer = log
            .audio_samples
            .get_mut(track)
            .ok_or(RecordingError::InvalidState("unknown audio track"))?;
        buffer.extend_from_slice(samples);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RecordedMedia, RecordingError> {
        let mut log = self.log.borrow_mut();
        log.finished = true;
        Ok(RecordedMedia {
            video: b"GIF89a".to_vec(),
            video_extension: "gif",
            audio: Vec::new(),
            frames: log.frame_sizes.len() as u64,
            duration: Duration::from_millis(100),
        })
    }
}
