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

//! Desktop application shell.
//!
//! Forwards button clicks, timer ticks and feed completion to the playback
//! [`Session`] and draws the map with the active radar layer on top.

use std::time::Duration;

use eframe::egui;
use log::{info, warn};
use radar_client::{FeedLoader, Session};
use walkers::{lon_lat, HttpTiles, Map, MapMemory, Position};

use crate::config::AppConfig;
use crate::map::{CartoTileSource, WalkersSurface};
use crate::ui::{ControlAction, PlaybackControls};

pub struct RadarApp {
    session: Session<WalkersSurface>,
    loader: FeedLoader,
    base_tiles: HttpTiles,
    map_memory: MapMemory,
    center: Position,
    controls: PlaybackControls,
    frame_interval: Duration,
}

impl RadarApp {
    /// Build the app and start the feed fetch. Must run inside the tokio runtime.
    pub fn new(ctx: &egui::Context, config: &AppConfig, client: reqwest::Client) -> Self {
        let surface = WalkersSurface::new(ctx.clone(), config.display.tile_size);
        let mut session = Session::new(surface, config.session_config());
        session.set_loading();

        let probe_options = config.probe_nowcast.then(|| config.display.clone());
        let loader = FeedLoader::spawn(client, config.feed_url.clone(), probe_options);

        let mut map_memory = MapMemory::default();
        if let Err(e) = map_memory.set_zoom(config.default_zoom) {
            warn!("Ignoring configured zoom {}: {:?}", config.default_zoom, e);
        }

        info!(
            "Radar map centered on {:.4}, {:.4}",
            config.center_latitude, config.center_longitude
        );

        Self {
            session,
            loader,
            base_tiles: CartoTileSource::tiles(ctx),
            map_memory,
            center: lon_lat(config.center_longitude, config.center_latitude),
            controls: PlaybackControls,
            frame_interval: config.frame_interval(),
        }
    }

    fn handle(&mut self, action: ControlAction) {
        match action {
            ControlAction::Previous => self.session.retreat(),
            ControlAction::TogglePlay => self.session.toggle(),
            ControlAction::Next => self.session.advance(),
        }
    }

    fn draw_map(&mut self, ui: &mut egui::Ui) {
        let layer = self.session.surface().active_layer();
        let opacity = self.session.surface().opacity();
        let mut layer_tiles = layer.as_ref().map(|layer| layer.borrow_mut());

        let mut map = Map::new(Some(&mut self.base_tiles), &mut self.map_memory, self.center);
        if let Some(tiles) = layer_tiles.as_mut() {
            map = map.with_layer(&mut **tiles, opacity);
        }
        ui.add(map);
    }
}

impl eframe::App for RadarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Some(event) = self.loader.try_next() {
            self.session.apply_event(event);
        }
        self.session.poll();

        // Ticks and the feed result arrive off-thread; keep polling while either is live.
        if self.loader.is_pending() || self.session.playback().is_playing {
            ctx.request_repaint_after(self.frame_interval);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_map(ui);
            });

        let status = self.session.status().to_string();
        let action = self.controls.render(
            ctx,
            self.session.playback().is_playing,
            self.session.toggle_label(),
            &status,
        );
        if let Some(action) = action {
            self.handle(action);
        }
    }
}
