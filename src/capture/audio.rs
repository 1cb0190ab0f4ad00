// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Microphone and system audio capture using cpal.
//!
//! The cpal stream is owned by a dedicated thread for its whole life. The
//! thread reports whether the device could be opened before the track is
//! handed out, and then pushes samples into a shared buffer that the
//! recorder drains once per frame.
//!
//! System audio is captured by opening an input stream on the default
//! output device. Only hosts with loopback support (WASAPI) accept this;
//! elsewhere opening the track fails and the source simply has no audio.

use super::{AudioTrack, CaptureError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Device an [`AudioDeviceTrack`] records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource {
    /// The default input device.
    Microphone,
    /// Loopback of the default output device.
    SystemAudio,
}

impl AudioSource {
    pub fn label(self) -> &'static str {
        match self {
            AudioSource::Microphone => "microphone",
            AudioSource::SystemAudio => "system-audio",
        }
    }
}

/// Samples kept when nobody drains the track, e.g. while only previewing.
const MAX_BUFFERED_SECONDS: usize = 2;

/// Format negotiated with the input device.
#[derive(Debug, Clone)]
struct StreamFormat {
    device_name: String,
    sample_rate: u32,
    channels: u16,
}

/// Live audio feed from a cpal device.
pub struct AudioDeviceTrack {
    source: AudioSource,
    sample_rate: u32,
    channels: u16,
    buffer: Arc<Mutex<Vec<f32>>>,
    live: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl AudioDeviceTrack {
    /// Open the default device for `source`.
    pub fn open(source: AudioSource) -> Result<Self, CaptureError> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let live = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = sync_channel(1);

        let thread_buffer = buffer.clone();
        let thread_live = live.clone();
        let thread = thread::Builder::new()
            .name(source.label().to_string())
            .spawn(move || run_stream(source, thread_buffer, thread_live, ready_tx))
            .map_err(|e| CaptureError::Unavailable(format!("Failed to start audio thread: {}", e)))?;

        let format = match ready_rx.recv() {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(CaptureError::Unavailable("Audio thread exited".to_string()));
            }
        };

        log::info!(
            "Opened {} on {} ({} channels, {} Hz)",
            source.label(),
            format.device_name,
            format.channels,
            format.sample_rate
        );

        Ok(Self {
            source,
            sample_rate: format.sample_rate,
            channels: format.channels,
            buffer,
            live,
            thread: Some(thread),
        })
    }
}

impl AudioTrack for AudioDeviceTrack {
    fn label(&self) -> &str {
        self.source.label()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn drain(&mut self) -> Vec<f32> {
        match self.buffer.lock() {
            Ok(mut samples) => std::mem::take(&mut *samples),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
            log::info!("Stopped {}", self.source.label());
        }
    }
}

impl Drop for AudioDeviceTrack {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of the audio thread: open the stream, report, then keep it alive
/// until the track is stopped or the device fails.
fn run_stream(
    source: AudioSource,
    buffer: Arc<Mutex<Vec<f32>>>,
    live: Arc<AtomicBool>,
    ready: SyncSender<Result<StreamFormat, CaptureError>>,
) {
    let stream = match build_stream(source, buffer, live.clone()) {
        Ok((stream, format)) => {
            let _ = ready.send(Ok(format));
            stream
        }
        Err(e) => {
            live.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(e));
            return;
        }
    };

    while live.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(20));
    }
    drop(stream);
}

fn build_stream(
    source: AudioSource,
    buffer: Arc<Mutex<Vec<f32>>>,
    live: Arc<AtomicBool>,
) -> Result<(cpal::Stream, StreamFormat), CaptureError> {
    let host = cpal::default_host();
    let (device, supported) = match source {
        AudioSource::Microphone => {
            let device = host
                .default_input_device()
                .ok_or_else(|| CaptureError::Unavailable("No audio input device found".to_string()))?;
            let supported = device.default_input_config();
            (device, supported)
        }
        AudioSource::SystemAudio => {
            let device = host
                .default_output_device()
                .ok_or_else(|| CaptureError::Unavailable("No audio output device found".to_string()))?;
            let supported = device.default_output_config();
            (device, supported)
        }
    };
    let supported = supported.map_err(|e| CaptureError::from_platform(e.to_string()))?;
    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let format = StreamFormat {
        device_name,
        sample_rate: supported.sample_rate().0,
        channels: supported.channels(),
    };
    let config: cpal::StreamConfig = supported.config();
    let capacity = format.sample_rate as usize * format.channels as usize * MAX_BUFFERED_SECONDS;

    let on_error = move |err: cpal::StreamError| {
        log::error!("{} stream error: {}", source.label(), err);
        live.store(false, Ordering::SeqCst);
    };

    let stream = match supported.sample_format() {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| push_samples(&buffer, capacity, data.iter().copied()),
            on_error,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                push_samples(&buffer, capacity, data.iter().map(|&s| s as f32 / 32768.0))
            },
            on_error,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            &config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                push_samples(&buffer, capacity, data.iter().map(|&s| (s as f32 - 32768.0) / 32768.0))
            },
            on_error,
            None,
        ),
        other => {
            return Err(CaptureError::Unavailable(format!(
                "Unsupported audio format: {:?}",
                other
            )))
        }
    }
    .map_err(|e| CaptureError::from_platform(e.to_string()))?;

    stream
        .play()
        .map_err(|e| CaptureError::from_platform(e.to_string()))?;

    Ok((stream, format))
}

fn push_samples(buffer: &Mutex<Vec<f32>>, capacity: usize, samples: impl Iterator<Item = f32>) {
    if let Ok(mut buf) = buffer.lock() {
        buf.extend(samples);
        trim_to_capacity(&mut buf, capacity);
    }
}

/// Drop the oldest samples beyond `capacity`.
fn trim_to_capacity(buf: &mut Vec<f32>, capacity: usize) {
    if buf.len() > capacity {
        let excess = buf.len() - capacity;
        buf.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undrained_buffer_keeps_newest_samples() {
        let mut buf: Vec<f32> = (0..10).map(|i| i as f32).collect();
        trim_to_capacity(&mut buf, 4);
        assert_eq!(buf, vec![6.0, 7.0, 8.0, 9.0]);

        trim_to_capacity(&mut buf, 8);
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(AudioSource::Microphone.label(), "microphone");
        assert_eq!(AudioSource::SystemAudio.label(), "system-audio");
    }
}
