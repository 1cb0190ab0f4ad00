// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Saving recordings to disk.
//!
//! The video goes to the path the user picked; each audio track is written
//! next to it as `<stem>-<label>.wav`.

use crate::recording::RecordedMedia;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Build a file name like `screen-recording-1718000000000.gif`.
pub fn generated_file_name(prefix: &str, extension: &str, unix_millis: u128) -> String {
    format!("{}-{}.{}", prefix, unix_millis, extension)
}

/// File name stamped with the current time.
pub fn timestamped_file_name(prefix: &str, extension: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    generated_file_name(prefix, extension, millis)
}

/// Path of an audio track saved alongside `video_path`.
pub fn audio_path(video_path: &Path, label: &str) -> PathBuf {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());
    video_path.with_file_name(format!("{}-{}.wav", stem, label))
}

/// Write the recording and return every file created.
pub fn write_recording(media: &RecordedMedia, video_path: &Path) -> Result<Vec<PathBuf>> {
    if let Some(parent) = video_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(video_path, &media.video)
        .with_context(|| format!("Failed to write {}", video_path.display()))?;
    let mut written = vec![video_path.to_path_buf()];

    for track in &media.audio {
        let path = audio_path(video_path, &track.label);
        std::fs::write(&path, &track.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    log::info!("Saved recording to {}", video_path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordedAudio;
    use std::time::Duration;

    #[test]
    fn test_generated_file_name() {
        assert_eq!(
            generated_file_name("screen-recording", "gif", 1_718_000_000_000),
            "screen-recording-1718000000000.gif"
        );
    }

    #[test]
    fn test_timestamped_file_name_shape() {
        let name = timestamped_file_name("clip", "gif");
        assert!(name.starts_with("clip-"));
        assert!(name.ends_with(".gif"));
    }

    #[test]
    fn test_audio_path_next_to_video() {
        let path = audio_path(Path::new("/tmp/out/screen-recording-1.gif"), "microphone");
        assert_eq!(path, PathBuf::from("/tmp/out/screen-recording-1-microphone.wav"));
    }

    #[test]
    fn test_write_recording_creates_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let video_path = dir.path().join("sub").join("take.gif");
        let media = RecordedMedia {
            video: b"GIF89a...".to_vec(),
            video_extension: "gif",
            audio: vec![RecordedAudio {
                label: "microphone".to_string(),
                bytes: b"RIFF....".to_vec(),
            }],
            frames: 1,
            duration: Duration::from_millis(100),
        };

        let written = write_recording(&media, &video_path).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read(&video_path).unwrap(), media.video);
        assert_eq!(
            std::fs::read(dir.path().join("sub").join("take-microphone.wav")).unwrap(),
            b"RIFF....".to_vec()
        );
    }
}
