// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings are read from `CROP_RECORDER_CONFIG` when set, otherwise from
//! `crop-recorder/config.yaml` in the platform config directory. A missing
//! or unreadable file falls back to defaults.

use crate::models::editor::MoveClamp;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CROP_RECORDER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on recorded frames per second; `None` follows the display.
    pub frame_rate_cap: Option<u32>,
    /// Edge behavior when dragging a region.
    pub move_clamp: MoveClamp,
    /// Mix the default microphone into recordings.
    pub include_microphone: bool,
    /// Record the source's system audio when the platform provides it.
    pub include_system_audio: bool,
    /// Size of the corner handles, in preview pixels.
    pub handle_radius: f32,
    /// GIF encoder speed, 1 (best) to 30 (fastest).
    pub gif_speed: i32,
    /// File name prefix for saved recordings.
    pub filename_prefix: String,
    /// Directory the save dialog opens in.
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_rate_cap: None,
            move_clamp: MoveClamp::Independent,
            include_microphone: true,
            include_system_audio: true,
            handle_radius: 8.0,
            gif_speed: 10,
            filename_prefix: "screen-recording".to_string(),
            output_dir: None,
        }
    }
}

impl Config {
    /// Where settings are looked up when no override is given.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crop-recorder").join("config.yaml"))
    }

    /// Resolve the config path from the environment or the platform default.
    pub fn resolve_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path)
    }

    /// Load settings, falling back to defaults with a warning.
    pub fn load() -> Self {
        let Some(path) = Self::resolve_path() else {
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match crate::io::serialization::import_config(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp values into their valid ranges.
    pub fn sanitized(mut self) -> Self {
        self.gif_speed = self.gif_speed.clamp(1, 30);
        if !(self.handle_radius.is_finite() && self.handle_radius > 0.0) {
            self.handle_radius = Self::default().handle_radius;
        }
        self.frame_rate_cap = self.frame_rate_cap.filter(|&fps| fps > 0);
        if self.filename_prefix.trim().is_empty() {
            self.filename_prefix = Self::default().filename_prefix;
        }
        self
    }

    /// Directory the save dialog should start in.
    pub fn save_directory(&self) -> Option<PathBuf> {
        self.output_dir.clone().or_else(dirs::video_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("frame_rate_cap: 30\nmove_clamp: proportional\n").unwrap();

        assert_eq!(config.frame_rate_cap, Some(30));
        assert_eq!(config.move_clamp, MoveClamp::Proportional);
        assert!(config.include_microphone);
        assert!(config.include_system_audio);
        assert_eq!(config.filename_prefix, "screen-recording");
    }

    #[test]
    fn test_sanitized_clamps_values() {
        let config = Config {
            frame_rate_cap: Some(0),
            gif_speed: 99,
            handle_radius: -2.0,
            filename_prefix: "  ".to_string(),
            ..Config::default()
        }
        .sanitized();

        assert_eq!(config.frame_rate_cap, None);
        assert_eq!(config.gif_speed, 30);
        assert_eq!(config.handle_radius, 8.0);
        assert_eq!(config.filename_prefix, "screen-recording");
    }

    #[test]
    fn test_unknown_clamp_policy_rejected() {
        let result: Result<Config, _> = serde_yaml::from_str("move_clamp: sideways\n");
        assert!(result.is_err());
    }
}
