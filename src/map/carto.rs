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

//! Base map underneath the radar overlay.

use std::path::PathBuf;

use walkers::sources::{Attribution, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId};

const SUBDOMAINS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Carto CDN dark basemap tiles.
///
/// Requests are spread across the a-d subdomains by tile coordinate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartoTileSource;

impl CartoTileSource {
    fn subdomain(tile_id: TileId) -> char {
        SUBDOMAINS[((tile_id.x + tile_id.y) % 4) as usize]
    }

    /// Tiles for this source with an on-disk cache.
    pub fn tiles(ctx: &egui::Context) -> HttpTiles {
        let http_options = HttpOptions {
            cache: Some(cache_dir("basemap")),
            ..Default::default()
        };
        HttpTiles::with_options(Self, http_options, ctx.clone())
    }
}

impl TileSource for CartoTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://{}.basemaps.cartocdn.com/dark_all/{}/{}/{}.png",
            Self::subdomain(tile_id),
            tile_id.zoom,
            tile_id.x,
            tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenStreetMap contributors, © CARTO",
            url: "https://carto.com/attributions",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Per-layer tile cache directory.
pub fn cache_dir(layer: &str) -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("radar-loop")
        .join(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url_rotates_subdomain() {
        let source = CartoTileSource;
        assert_eq!(
            source.tile_url(TileId { x: 0, y: 0, zoom: 3 }),
            "https://a.basemaps.cartocdn.com/dark_all/3/0/0.png"
        );
        assert_eq!(
            source.tile_url(TileId { x: 2, y: 1, zoom: 3 }),
            "https://d.basemaps.cartocdn.com/dark_all/3/2/1.png"
        );
    }

    #[test]
    fn test_cache_dir_is_per_layer() {
        assert!(cache_dir("basemap").ends_with("radar-loop/basemap"));
    }
}
