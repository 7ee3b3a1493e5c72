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

//! Radar overlay layers on the walkers map.
//!
//! Each radar frame gets its own [`HttpTiles`] layer. The session's frame
//! store owns the layers; [`WalkersSurface`] only holds weak references to
//! the ones on screen.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;
use radar_client::{MapSurface, OverlayParams, TileUrlTemplate};
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId};

use super::carto::cache_dir;

/// Shared radar layer handle.
pub type RadarLayer = Rc<RefCell<HttpTiles>>;

/// Tile source for one radar frame.
#[derive(Debug, Clone)]
pub struct RadarTileSource {
    template: TileUrlTemplate,
    tile_size: u32,
    max_zoom: u8,
}

impl RadarTileSource {
    pub fn new(template: TileUrlTemplate, tile_size: u32, max_zoom: u8) -> Self {
        Self {
            template,
            tile_size,
            max_zoom,
        }
    }
}

impl TileSource for RadarTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.template.resolve(tile_id.zoom, tile_id.x, tile_id.y)
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Radar data © RainViewer",
            url: "https://www.rainviewer.com/api.html",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    // Upstream serves nothing past this zoom; walkers upscales lower tiles instead.
    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

/// Map surface backed by walkers tile layers.
pub struct WalkersSurface {
    ctx: egui::Context,
    tile_size: u32,
    opacity: f32,
    active: Vec<Weak<RefCell<HttpTiles>>>,
}

impl fmt::Debug for WalkersSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkersSurface")
            .field("tile_size", &self.tile_size)
            .field("opacity", &self.opacity)
            .field("active", &self.active.len())
            .finish_non_exhaustive()
    }
}

impl WalkersSurface {
    pub fn new(ctx: egui::Context, tile_size: u32) -> Self {
        Self {
            ctx,
            tile_size,
            opacity: OverlayParams::default().opacity,
            active: Vec::new(),
        }
    }

    /// The radar layer currently on screen, if its owner still holds it.
    pub fn active_layer(&self) -> Option<RadarLayer> {
        self.active.iter().rev().find_map(Weak::upgrade)
    }

    /// Opacity to draw the active layer with.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

impl MapSurface for WalkersSurface {
    type Overlay = RadarLayer;

    fn create_overlay(&mut self, template: &TileUrlTemplate, params: &OverlayParams) -> RadarLayer {
        debug!("New radar layer for {}", template);
        self.opacity = params.opacity;

        let source = RadarTileSource::new(template.clone(), self.tile_size, params.max_zoom);
        let http_options = HttpOptions {
            cache: Some(cache_dir("radar")),
            ..Default::default()
        };
        Rc::new(RefCell::new(HttpTiles::with_options(
            source,
            http_options,
            self.ctx.clone(),
        )))
    }

    fn clear_overlays(&mut self) {
        self.active.clear();
    }

    fn activate(&mut self, overlay: &RadarLayer) {
        self.active.push(Rc::downgrade(overlay));
        self.ctx.request_repaint();
    }

    fn active_overlays(&self) -> usize {
        self.active.iter().filter(|layer| layer.strong_count() > 0).count()
    }
}
