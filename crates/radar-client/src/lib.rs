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

//! Weather radar frame client and playback session.
//!
//! This library turns a radar frame feed into an animated map overlay. It is
//! split into small layers that can be used on their own:
//!
//! - **Feed layer**: fetching and parsing the frame list ([`feed`])
//! - **URL layer**: tile URL templates per frame ([`url`])
//! - **Frame layer**: ordered frames and the per-frame overlay cache ([`frames`])
//! - **Overlay layer**: frame selection over a [`MapSurface`] ([`overlay`])
//! - **Animation layer**: the fixed-cadence frame timer ([`animation`])
//!
//! [`Session`] wires them together behind one object.
//!
//! # Quick Start
//!
//! ```no_run
//! use radar_client::{MapSurface, OverlayParams, Session, SessionConfig, TileUrlTemplate};
//!
//! struct PrintSurface;
//!
//! impl MapSurface for PrintSurface {
//!     type Overlay = String;
//!
//!     fn create_overlay(&mut self, template: &TileUrlTemplate, _: &OverlayParams) -> String {
//!         template.to_string()
//!     }
//!     fn clear_overlays(&mut self) {}
//!     fn activate(&mut self, overlay: &String) {
//!         println!("showing {overlay}");
//!     }
//!     fn active_overlays(&self) -> usize {
//!         1
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = reqwest::Client::new();
//!     let mut session = Session::new(PrintSurface, SessionConfig::default());
//!     session.load(&client, radar_client::DEFAULT_FEED_URL).await;
//!     println!("{}", session.status());
//! }
//! ```
//!
//! # URL Layer Only
//!
//! ```
//! use radar_client::{build_tile_url, DisplayOptions, FrameDescriptor};
//!
//! let frame = FrameDescriptor { path: "/v2/radar/1755471000".to_string(), time: 1_755_471_000 };
//! let url = build_tile_url("https://tilecache.rainviewer.com", &frame, &DisplayOptions::default());
//! assert_eq!(
//!     url.as_str(),
//!     "https://tilecache.rainviewer.com/v2/radar/1755471000/512/{z}/{x}/{y}/2/1_1.png"
//! );
//! ```

pub mod animation;
pub mod feed;
pub mod frames;
pub mod overlay;
pub mod session;
pub mod url;

pub use animation::{AnimationDriver, AnimationState, DEFAULT_FRAME_INTERVAL};
pub use feed::{
    fetch_feed, probe_frames, FeedError, FeedEvent, FeedLoader, RadarFeed, RadarFrames, DEFAULT_FEED_URL,
    PROBE_TIMEOUT,
};
pub use frames::{normalize_index, FrameDescriptor, FrameStore};
pub use overlay::{MapSurface, OverlayController, OverlayParams};
pub use session::{format_frame_time, PlaybackState, Session, SessionConfig, StatusText};
pub use url::{build_tile_url, DisplayOptions, TileUrlTemplate};
