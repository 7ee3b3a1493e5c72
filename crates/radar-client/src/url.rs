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

//! Tile URL construction for radar frames.
//!
//! Radar tiles are addressed as
//! `<host><path>/<size>/{z}/{x}/{y}/<color>/<smooth>_<snow>.<ext>`.
//! The builder keeps the `{z}/{x}/{y}` placeholders so the map layer can
//! resolve them per tile request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frames::FrameDescriptor;

/// Rendering options baked into every radar tile URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Tile edge length in pixels (256 or 512).
    pub tile_size: u32,
    /// Upstream color scheme identifier.
    pub color_scheme: u8,
    /// Smooth the radar image.
    pub smooth: bool,
    /// Color snow differently from rain.
    pub snow: bool,
    /// Image format extension, without the dot.
    pub extension: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            tile_size: 512,
            color_scheme: 2,
            smooth: true,
            snow: true,
            extension: "png".to_string(),
        }
    }
}

/// A tile URL with `{z}`, `{x}` and `{y}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileUrlTemplate(String);

impl TileUrlTemplate {
    /// Substitute concrete tile coordinates.
    #[must_use]
    pub fn resolve(&self, zoom: u8, x: u32, y: u32) -> String {
        self.0
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileUrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the tile URL template for a frame.
///
/// Host and path are concatenated as-is; an empty path still yields a
/// template of the usual shape.
#[must_use]
pub fn build_tile_url(host: &str, frame: &FrameDescriptor, options: &DisplayOptions) -> TileUrlTemplate {
    TileUrlTemplate(format!(
        "{}{}/{}/{{z}}/{{x}}/{{y}}/{}/{}_{}.{}",
        host,
        frame.path,
        options.tile_size,
        options.color_scheme,
        u8::from(options.smooth),
        u8::from(options.snow),
        options.extension
    ))
}
