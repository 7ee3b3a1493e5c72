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

mod app;
mod config;
mod map;
mod ui;

use std::error::Error;

use clap::Parser;
use eframe::egui;
use log::{info, warn};
use radar_client::{build_tile_url, fetch_feed, format_frame_time, FeedError};

use app::RadarApp;
use config::AppConfig;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Animated weather radar over a dark slippy map
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Radar frame feed URL (overrides the config file)
    #[arg(long)]
    feed_url: Option<String>,

    /// Delay between animation frames in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Initial map zoom level
    #[arg(long)]
    zoom: Option<f64>,

    /// Print the available frames and their tile URLs, then exit
    #[arg(long)]
    list_frames: bool,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.feed_url {
            config.feed_url.clone_from(url);
        }
        if let Some(interval) = self.interval_ms {
            config.frame_interval_ms = interval;
        }
        if let Some(zoom) = self.zoom {
            config.default_zoom = zoom;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::get_config_path() {
        info!("Config file: {}", path.display());
    }
    args.apply(&mut config);

    let runtime = tokio::runtime::Runtime::new()?;
    let client = reqwest::Client::new();

    if args.list_frames {
        return runtime.block_on(list_frames(&client, &config));
    }

    // Feed and animation tasks are spawned from the UI thread
    let _guard = runtime.enter();

    info!("Starting Radar Loop...");
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Radar Loop"),
        ..Default::default()
    };

    eframe::run_native(
        "Radar Loop",
        options,
        Box::new(move |cc| Ok(Box::new(RadarApp::new(&cc.egui_ctx, &config, client)))),
    )?;

    Ok(())
}

/// Headless mode: one line per frame with its local time and tile template.
async fn list_frames(client: &reqwest::Client, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let feed = fetch_feed(client, &config.feed_url).await?;
    let frames = feed.frames();
    if frames.is_empty() {
        return Err(FeedError::Empty.into());
    }

    let past = feed.radar.past.len();
    for (index, frame) in frames.iter().enumerate() {
        let kind = if index < past { "past" } else { "nowcast" };
        println!(
            "{:>3}  {:<7}  {}  {}",
            index,
            kind,
            format_frame_time(frame.time),
            build_tile_url(&feed.host, frame, &config.display)
        );
    }

    Ok(())
}
