// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Loaded from a YAML file, then overridden from the command line. There is
//! no built-in API key.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const CLIP_BASE: &str = "https://raw.githubusercontent.com/breadstalker/pazhampazutho/main";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub inference: InferenceConfig,
    pub audio: AudioConfig,
    pub camera: CameraConfig,
}

/// Inference service location and credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Ask the service for a JSON-only reply.
    pub structured_output: bool,
    /// `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            structured_output: false,
            timeout_secs: Some(120),
        }
    }
}

/// Audio cue settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
    pub unripe_url: String,
    pub ripe_url: String,
    pub overripe_url: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.7,
            unripe_url: format!("{}/unripe.mp3", CLIP_BASE),
            ripe_url: format!("{}/ripe.mp3", CLIP_BASE),
            overripe_url: format!("{}/overripe.mp3", CLIP_BASE),
        }
    }
}

/// External still-capture command, e.g. `["fswebcam", "--no-banner", "{output}"]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub command: Vec<String>,
}

impl CameraConfig {
    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}

/// Overrides taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub no_sound: bool,
}

impl AppConfig {
    /// Load from `path`, or from the default location when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    log::info!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(key) = overrides.api_key {
            self.inference.api_key = Some(key);
        }
        if let Some(model) = overrides.model {
            self.inference.model = model;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.inference.endpoint = endpoint;
        }
        if overrides.no_sound {
            self.audio.enabled = false;
        }
        self.audio.volume = self.audio.volume.clamp(0.0, 1.0);
    }
}

/// `<config dir>/pazhampazhutho/config.yaml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pazhampazhutho").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_have_no_secret() {
        let config = AppConfig::default();
        assert!(config.inference.api_key.is_none());
        assert_eq!(config.inference.model, DEFAULT_MODEL);
        assert!(!config.camera.is_configured());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "inference:\n  model: gemini-2.0-flash\naudio:\n  volume: 0.3\ncamera:\n  command: [fswebcam, \"{{output}}\"]"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.inference.model, "gemini-2.0-flash");
        assert_eq!(config.inference.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.audio.volume, 0.3);
        assert!(config.audio.enabled);
        assert_eq!(config.camera.command, vec!["fswebcam", "{output}"]);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = AppConfig::default();
        config.audio.volume = 3.0;
        config.apply(Overrides {
            api_key: Some("k".to_string()),
            model: Some("m".to_string()),
            endpoint: None,
            no_sound: true,
        });

        assert_eq!(config.inference.api_key.as_deref(), Some("k"));
        assert_eq!(config.inference.model, "m");
        assert_eq!(config.inference.endpoint, DEFAULT_ENDPOINT);
        assert!(!config.audio.enabled);
        assert_eq!(config.audio.volume, 1.0);
    }
}
