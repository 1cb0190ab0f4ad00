// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recorder sink that writes an animated GIF plus one WAV per audio track.
//!
//! Output is staged in a directory (the system temp dir by default) while
//! recording, then read back into memory and removed on `finish`.
//!
//! Frames are encoded on a separate thread fed through a bounded channel, and
//! `write_frame` only copies the frame into the queue. When the queue is full
//! the new frame is dropped and the previous one is held for longer.

use super::{AudioFormat, RecordedAudio, RecordedMedia, RecorderSink, RecordingError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// GIF viewers treat very short delays as "slow", so never go below this.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);

/// Delay of the last frame when there is nothing to measure it against.
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Frames waiting for the encoder before new ones are dropped.
const FRAME_QUEUE_DEPTH: usize = 8;

/// What the encoder thread reports once the channel closes.
#[derive(Debug, Clone, Copy)]
struct GifSummary {
    frames: u64,
    duration: Duration,
}

/// Owns the GIF encoder on the encoder thread.
struct GifEncoding {
    encoder: GifEncoder<BufWriter<File>>,
    last_delay: Duration,
    frames: u64,
}

impl GifEncoding {
    fn encode(&mut self, image: RgbaImage, delay: Duration) -> Result<(), RecordingError> {
        let delay = delay.max(MIN_FRAME_DELAY);
        let frame = Frame::from_parts(image, 0, 0, Delay::from_saturating_duration(delay));
        self.encoder.encode_frame(frame)?;
        self.last_delay = delay;
        self.frames += 1;
        Ok(())
    }
}

/// Body of the encoder thread: encode frames until the sender hangs up.
fn run_encoder(
    encoder: GifEncoder<BufWriter<File>>,
    frames: Receiver<(RgbaImage, Instant)>,
) -> Result<GifSummary, RecordingError> {
    let mut gif = GifEncoding {
        encoder,
        last_delay: DEFAULT_FRAME_DELAY,
        frames: 0,
    };
    let mut pending: Option<(RgbaImage, Instant)> = None;
    let mut first_at: Option<Instant> = None;

    for (image, at) in frames {
        // A frame's delay is only known once the next one arrives.
        if let Some((previous, previous_at)) = pending.take() {
            gif.encode(previous, at.saturating_duration_since(previous_at))?;
        }
        first_at.get_or_insert(at);
        pending = Some((image, at));
    }

    let mut duration = Duration::ZERO;
    if let Some((last, last_at)) = pending.take() {
        let delay = gif.last_delay;
        gif.encode(last, delay)?;
        if let Some(first) = first_at {
            duration = last_at.saturating_duration_since(first) + gif.last_delay;
        }
    }

    // Dropping the encoder writes the GIF trailer and flushes the file.
    let frames = gif.frames;
    drop(gif);
    Ok(GifSummary { frames, duration })
}

struct GifTrack {
    path: PathBuf,
    frames: Option<SyncSender<(RgbaImage, Instant)>>,
    worker: Option<JoinHandle<Result<GifSummary, RecordingError>>>,
    dropped: u64,
}

impl GifTrack {
    /// Close the queue and wait for the encoder to finish the file.
    fn close(&mut self) -> Result<GifSummary, RecordingError> {
        self.frames = None;
        let worker = self
            .worker
            .take()
            .ok_or(RecordingError::InvalidState("GIF encoder already closed"))?;
        worker
            .join()
            .map_err(|_| RecordingError::InvalidState("GIF encoder thread panicked"))?
    }
}

struct WavTrack {
    label: String,
    path: PathBuf,
    writer: hound::WavWriter<BufWriter<File>>,
}

/// File-backed recorder sink.
pub struct FileSink {
    staging_dir: PathBuf,
    stem: String,
    gif_speed: i32,
    video: Option<GifTrack>,
    audio: Vec<WavTrack>,
}

impl FileSink {
    /// `gif_speed` trades quality for encoding speed (1 = best, 30 = fastest).
    pub fn new(staging_dir: impl Into<PathBuf>, gif_speed: i32) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            staging_dir: staging_dir.into(),
            stem: format!("crop-recorder-{}-{}", std::process::id(), millis),
            gif_speed: gif_speed.clamp(1, 30),
            video: None,
            audio: Vec::new(),
        }
    }

    /// Sink staging into the system temp directory.
    pub fn in_temp_dir(gif_speed: i32) -> Self {
        Self::new(std::env::temp_dir(), gif_speed)
    }

    fn staging_path(&self, suffix: &str) -> PathBuf {
        self.staging_dir.join(format!("{}{}", self.stem, suffix))
    }
}

fn read_and_remove(path: &Path) -> Result<Vec<u8>, RecordingError> {
    let bytes = std::fs::read(path)?;
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!("Failed to remove staging file {}: {}", path.display(), e);
    }
    Ok(bytes)
}

impl RecorderSink for FileSink {
    fn begin(&mut self, width: u32, height: u32, audio: &[AudioFormat]) -> Result<(), RecordingError> {
        if self.video.is_some() {
            return Err(RecordingError::InvalidState("begin called twice"));
        }
        std::fs::create_dir_all(&self.staging_dir)?;

        let path = self.staging_path(".gif");
        let file = BufWriter::new(File::create(&path)?);
        let mut encoder = GifEncoder::new_with_speed(file, self.gif_speed);
        encoder.set_repeat(Repeat::Infinite)?;
        log::debug!("Staging {}x{} GIF at {}", width, height, path.display());

        let (sender, receiver) = sync_channel(FRAME_QUEUE_DEPTH);
        let worker = thread::Builder::new()
            .name("gif-encoder".to_string())
            .spawn(move || run_encoder(encoder, receiver))?;

        self.video = Some(GifTrack {
            path,
            frames: Some(sender),
            worker: Some(worker),
            dropped: 0,
        });

        for (index, format) in audio.iter().enumerate() {
            let spec = hound::WavSpec {
                channels: format.channels,
                sample_rate: format.sample_rate,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            };
            let path = self.staging_path(&format!("-{}.wav", index));
            let writer = hound::WavWriter::create(&path, spec)?;
            self.audio.push(WavTrack {
                label: format.label.clone(),
                path,
                writer,
            });
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: &RgbaImage, at: Instant) -> Result<(), RecordingError> {
        let video = self
            .video
            .as_mut()
            .ok_or(RecordingError::InvalidState("write_frame before begin"))?;
        let sender = video
            .frames
            .as_ref()
            .ok_or(RecordingError::InvalidState("write_frame after finish"))?;

        match sender.try_send((frame.clone(), at)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                video.dropped += 1;
                if video.dropped.is_power_of_two() {
                    log::warn!("GIF encoder is behind, {} frame(s) dropped", video.dropped);
                }
                Ok(())
            }
            // The encoder stopped early; its error explains why.
            Err(TrySendError::Disconnected(_)) => match video.close() {
                Err(e) => Err(e),
                Ok(_) => Err(RecordingError::InvalidState("GIF encoder stopped")),
            },
        }
    }

    fn write_audio(&mut self, track: usize, samples: &[f32]) -> Result<(), RecordingError> {
        let wav = self
            .audio
            .get_mut(track)
            .ok_or(RecordingError::InvalidState("unknown audio track"))?;
        for &sample in samples {
            wav.writer.write_sample(sample)?;
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<RecordedMedia, RecordingError> {
        let mut video = self
            .video
            .take()
            .ok_or(RecordingError::InvalidState("finish before begin"))?;

        let summary = video.close();
        let video_path = video.path.clone();
        // Put the track back so a failure below still removes the staged file.
        self.video = Some(video);
        let summary = summary?;
        if let Some(video) = self.video.as_ref().filter(|v| v.dropped > 0) {
            log::info!("{} frame(s) dropped while encoding", video.dropped);
        }
        let video_bytes = read_and_remove(&video_path)?;
        self.video = None;

        let mut audio = Vec::new();
        for wav in std::mem::take(&mut self.audio) {
            wav.writer.finalize()?;
            audio.push(RecordedAudio {
                label: wav.label,
                bytes: read_and_remove(&wav.path)?,
            });
        }

        Ok(RecordedMedia {
            video: video_bytes,
            video_extension: "gif",
            audio,
            frames: summary.frames,
            duration: summary.duration,
        })
    }
}

impl Drop for FileSink {
    /// Remove staged files of a recording that was never finished.
    fn drop(&mut self) {
        let mut paths = Vec::new();
        if let Some(mut video) = self.video.take() {
            // The encoder holds the file open until it exits.
            if video.worker.is_some() {
                let _ = video.close();
            }
            paths.push(video.path.clone());
        }
        for wav in self.audio.drain(..) {
            paths.push(wav.path.clone());
        }
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }
}
