// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Config file serialization and deserialization.
//!
//! This module reads and writes settings in YAML or JSON, chosen by file
//! extension.

use crate::config::Config;
use anyhow::{bail, Result};
use std::path::Path;

/// Export settings to YAML format.
pub fn export_yaml(config: &Config, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export settings to JSON format.
pub fn export_json(config: &Config, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import settings from YAML format.
pub fn import_yaml(path: &Path) -> Result<Config> {
    let yaml = std::fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&yaml)?;
    Ok(config)
}

/// Import settings from JSON format.
pub fn import_json(path: &Path) -> Result<Config> {
    let json = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&json)?;
    Ok(config)
}

/// Import settings, picking the format from the extension.
pub fn import_config(path: &Path) -> Result<Config> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => bail!("Unsupported config extension: {:?}", other),
    }
}

/// Export settings, picking the format from the extension.
pub fn export_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(config, path),
        Some("json") => export_json(config, path),
        other => bail!("Unsupported config extension: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::editor::MoveClamp;

    fn sample() -> Config {
        Config {
            frame_rate_cap: Some(30),
            move_clamp: MoveClamp::Proportional,
            include_microphone: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        export_config(&sample(), &path).unwrap();
        assert_eq!(import_config(&path).unwrap(), sample());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        export_config(&sample(), &path).unwrap();
        assert_eq!(import_config(&path).unwrap(), sample());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "frame_rate_cap = 30").unwrap();

        assert!(import_config(&path).is_err());
        assert!(export_config(&sample(), &path).is_err());
    }
}
