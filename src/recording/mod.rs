// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recording sessions and recorder sinks.
//!
//! A [`MediaSession`] bundles exactly one video track (the raw source or the
//! cropped compositor) with zero or more audio tracks, and feeds them into a
//! [`RecorderSink`] once per UI frame.

pub mod file_sink;

use crate::capture::AudioTrack;
use crate::compositor::{CroppedCompositor, FramePacer, Tick};
use crate::models::region::SelectedRegion;
use crate::util::geometry::SourceSize;
use image::RgbaImage;
use std::time::{Duration, Instant};

pub use file_sink::FileSink;

/// Errors raised by recorder sinks.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("Video encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Audio encoding failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recorder used out of order: {0}")]
    InvalidState(&'static str),
}

/// Format of one audio track handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormat {
    pub label: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// One recorded audio track.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    pub label: String,
    pub bytes: Vec<u8>,
}

/// Everything a sink produced for one recording.
#[derive(Debug, Clone)]
pub struct RecordedMedia {
    pub video: Vec<u8>,
    pub video_extension: &'static str,
    pub audio: Vec<RecordedAudio>,
    pub frames: u64,
    pub duration: Duration,
}

/// Consumer of recorded video frames and audio samples.
pub trait RecorderSink {
    /// Prepare for frames of `width` x `height` and the given audio tracks.
    fn begin(&mut self, width: u32, height: u32, audio: &[AudioFormat]) -> Result<(), RecordingError>;

    fn write_frame(&mut self, frame: &RgbaImage, at: Instant) -> Result<(), RecordingError>;

    /// Append interleaved samples to audio track `track`.
    fn write_audio(&mut self, track: usize, samples: &[f32]) -> Result<(), RecordingError>;

    /// Close the recording and yield its bytes.
    fn finish(self: Box<Self>) -> Result<RecordedMedia, RecordingError>;
}

/// The video track handed to the recorder.
#[derive(Debug)]
pub enum VideoTrack {
    /// The source frames, unmodified.
    Source(FramePacer),
    /// Frames cropped to the selected region.
    Cropped(CroppedCompositor),
}

impl VideoTrack {
    /// Pick the track for the current region.
    ///
    /// No region, or a region without area, records the raw source.
    pub fn for_region(region: Option<&SelectedRegion>, frame_rate_cap: Option<u32>) -> Self {
        match region.and_then(|r| CroppedCompositor::new(r, frame_rate_cap)) {
            Some(compositor) => VideoTrack::Cropped(compositor),
            None => VideoTrack::Source(FramePacer::new(frame_rate_cap)),
        }
    }

    pub fn is_cropped(&self) -> bool {
        matches!(self, VideoTrack::Cropped(_))
    }

    /// Size of the frames this track produces.
    pub fn output_size(&self, source: SourceSize) -> (u32, u32) {
        match self {
            VideoTrack::Source(_) => (source.width, source.height),
            VideoTrack::Cropped(compositor) => compositor.surface_size(),
        }
    }

    /// The frame to record for this tick, if one is due.
    pub fn render<'a>(&'a mut self, now: Instant, frame: &'a RgbaImage) -> Option<&'a RgbaImage> {
        match self {
            VideoTrack::Source(pacer) => pacer.ready(now).then_some(frame),
            VideoTrack::Cropped(compositor) => match compositor.tick(now, frame) {
                Tick::Drawn => Some(compositor.surface()),
                Tick::Skipped | Tick::Stopped => None,
            },
        }
    }

    pub fn stop(&mut self) {
        if let VideoTrack::Cropped(compositor) = self {
            compositor.stop();
        }
    }
}

/// A running recording.
pub struct MediaSession {
    video: VideoTrack,
    audio: Vec<Box<dyn AudioTrack>>,
    sink: Box<dyn RecorderSink>,
    frames: u64,
}

impl MediaSession {
    /// Begin recording. On failure every audio track is stopped again.
    pub fn start(
        video: VideoTrack,
        mut audio: Vec<Box<dyn AudioTrack>>,
        mut sink: Box<dyn RecorderSink>,
        source: SourceSize,
    ) -> Result<Self, RecordingError> {
        let (width, height) = video.output_size(source);
        let formats: Vec<AudioFormat> = audio
            .iter()
            .map(|t| AudioFormat {
                label: t.label().to_string(),
                sample_rate: t.sample_rate(),
                channels: t.channels(),
            })
            .collect();

        if let Err(e) = sink.begin(width, height, &formats) {
            for track in audio.iter_mut() {
                track.stop();
            }
            return Err(e);
        }

        // Samples captured before the recording started are not part of it.
        for track in audio.iter_mut() {
            track.drain();
        }

        log::info!(
            "Recording started: {}x{} {} video, {} audio track(s)",
            width,
            height,
            if video.is_cropped() { "cropped" } else { "source" },
            formats.len()
        );

        Ok(Self {
            video,
            audio,
            sink,
            frames: 0,
        })
    }

    pub fn video(&self) -> &VideoTrack {
        &self.video
    }

    pub fn audio_track_count(&self) -> usize {
        self.audio.len()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Record one source frame (if due) and any pending audio.
    pub fn push(&mut self, now: Instant, frame: &RgbaImage) -> Result<(), RecordingError> {
        if let Some(out) = self.video.render(now, frame) {
            self.sink.write_frame(out, now)?;
            self.frames += 1;
        }
        self.drain_audio()
    }

    fn drain_audio(&mut self) -> Result<(), RecordingError> {
        for (index, track) in self.audio.iter_mut().enumerate() {
            let samples = track.drain();
            if !samples.is_empty() {
                self.sink.write_audio(index, &samples)?;
            }
        }
        Ok(())
    }

    /// Stop every track and close the sink.
    pub fn finish(mut self) -> Result<RecordedMedia, RecordingError> {
        let drained = self.drain_audio();
        for track in self.audio.iter_mut() {
            track.stop();
        }
        self.video.stop();
        drained?;

        let media = self.sink.finish()?;
        log::info!(
            "Recording finished: {} frames, {:.1}s",
            media.frames,
            media.duration.as_secs_f64()
        );
        Ok(media)
    }
}
