// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User settings that persist across app sessions.
//!
//! Loaded once at startup from a YAML file in the platform config
//! directory. A missing or malformed file falls back to defaults; the
//! app never refuses to start over settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the tracking service.
    #[serde(default = "default_tracking_service_url")]
    pub tracking_service_url: String,

    /// Initial window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: f32,

    /// Initial window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: f32,

    /// Largest per-track gap, in frames, that interpolation will fill.
    #[serde(default = "default_interpolation_max_gap")]
    pub interpolation_max_gap: u32,
}

fn default_tracking_service_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_window_width() -> f32 {
    1280.0
}

fn default_window_height() -> f32 {
    720.0
}

fn default_interpolation_max_gap() -> u32 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tracking_service_url: default_tracking_service_url(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            interpolation_max_gap: default_interpolation_max_gap(),
        }
    }
}

impl Settings {
    /// Path of the settings file inside the platform config directory.
    pub fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("tunascope").join("settings.yaml")
    }

    /// Load settings, falling back to defaults on any failure.
    pub fn load() -> Self {
        let path = Self::settings_path();
        if !path.exists() {
            log::info!("Settings file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_yaml::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    log::error!("Failed to parse settings file at {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::error!("Failed to read settings file at {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings.tracking_service_url, "http://127.0.0.1:5000");
        assert_eq!(settings.window_width, 1280.0);
        assert_eq!(settings.interpolation_max_gap, 30);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let settings: Settings =
            serde_yaml::from_str("tracking_service_url: http://10.0.0.2:5000\n").unwrap();
        assert_eq!(settings.tracking_service_url, "http://10.0.0.2:5000");
        assert_eq!(settings.window_height, 720.0);
    }
}
