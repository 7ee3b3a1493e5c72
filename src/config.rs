// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Settings are stored as TOML through confy. Every field has a serde
//! default so older or hand-edited files with missing keys still load.

use std::time::Duration;

use radar_client::{DisplayOptions, OverlayParams, SessionConfig, DEFAULT_FEED_URL};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "radar-loop";
const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Radar frame feed URL
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Delay between animation frames in milliseconds
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Initial map center latitude
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,

    /// Initial map center longitude
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,

    /// Initial map zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Probe nowcast frames and skip the ones the tile host does not serve yet
    #[serde(default = "default_true")]
    pub probe_nowcast: bool,

    /// Radar tile rendering options
    #[serde(default)]
    pub display: DisplayOptions,

    /// Radar overlay layer parameters
    #[serde(default)]
    pub overlay: OverlayParams,
}

// Default value functions for serde
fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_frame_interval_ms() -> u64 {
    500
}

fn default_center_latitude() -> f64 {
    37.7749
}

fn default_center_longitude() -> f64 {
    -122.4194
}

fn default_zoom() -> f64 {
    6.0
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            frame_interval_ms: default_frame_interval_ms(),
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            default_zoom: default_zoom(),
            probe_nowcast: true,
            display: DisplayOptions::default(),
            overlay: OverlayParams::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// Settings handed to the playback session
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            display: self.display.clone(),
            overlay: self.overlay.clone(),
            frame_interval: self.frame_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_radar_parameters() {
        let config = AppConfig::default();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.frame_interval(), Duration::from_millis(500));

        let session = config.session_config();
        assert_eq!(session.display.tile_size, 512);
        assert_eq!(session.display.color_scheme, 2);
        assert!(session.display.smooth);
        assert!(session.display.snow);
        assert_eq!(session.display.extension, "png");
        assert!((session.overlay.opacity - 0.6).abs() < f32::EPSILON);
        assert_eq!(session.overlay.max_zoom, 9);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            frame_interval_ms = 250

            [display]
            color_scheme = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.frame_interval_ms, 250);
        assert_eq!(config.display.color_scheme, 4);
        assert_eq!(config.display.tile_size, 512);
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert!(config.probe_nowcast);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = AppConfig {
            frame_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
