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

//! Radar frame feed fetching and parsing.
//!
//! The feed is a single JSON document listing past and nowcast frames:
//!
//! ```json
//! { "host": "https://tilecache.rainviewer.com",
//!   "radar": { "past": [{ "path": "/v2/radar/1755471000", "time": 1755471000 }],
//!              "nowcast": [] } }
//! ```
//!
//! Sections that are missing, `null` or of the wrong type are treated as
//! empty rather than as errors. Only a body that is not JSON at all fails.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::frames::FrameDescriptor;
use crate::url::{build_tile_url, DisplayOptions};

/// Public RainViewer frame feed.
pub const DEFAULT_FEED_URL: &str = "https://api.rainviewer.com/public/weather-maps.json";

/// Tile fetched per frame when probing availability.
const PROBE_TILE: (u8, u32, u32) = (2, 1, 1);

/// Per-tile deadline when probing availability.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that end a feed load attempt.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed with HTTP {0}")]
    Status(StatusCode),

    #[error("feed request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed feed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("feed contains no radar frames")]
    Empty,
}

/// Deserialize a field, falling back to its default on `null` or a type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Radar section of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RadarFrames {
    #[serde(deserialize_with = "lenient")]
    pub past: Vec<FrameDescriptor>,
    #[serde(deserialize_with = "lenient")]
    pub nowcast: Vec<FrameDescriptor>,
}

/// Parsed feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RadarFeed {
    /// Tile host prefix for every frame path.
    #[serde(deserialize_with = "lenient")]
    pub host: String,
    #[serde(deserialize_with = "lenient")]
    pub radar: RadarFrames,
}

impl RadarFeed {
    /// Parse a feed body.
    ///
    /// Any JSON document parses; one of an unexpected shape yields no frames.
    pub fn parse(body: &[u8]) -> Result<Self, FeedError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        Ok(Self::deserialize(value).unwrap_or_else(|e| {
            debug!("Feed has an unexpected shape: {}", e);
            Self::default()
        }))
    }

    /// Past frames followed by nowcast frames.
    #[must_use]
    pub fn frames(&self) -> Vec<FrameDescriptor> {
        self.radar
            .past
            .iter()
            .chain(&self.radar.nowcast)
            .cloned()
            .collect()
    }

    /// Index of the most recent observed frame.
    ///
    /// Falls back to the last frame overall when there are no past frames.
    #[must_use]
    pub fn latest_past_index(&self) -> Option<usize> {
        match self.radar.past.len() {
            0 => self.radar.nowcast.len().checked_sub(1),
            n => Some(n - 1),
        }
    }
}

/// Fetch and parse the feed once. No retry.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<RadarFeed, FeedError> {
    info!("Fetching radar feed from {}", url);

    let response = client.get(url).send().await.map_err(FeedError::Transport)?;
    if !response.status().is_success() {
        return Err(FeedError::Status(response.status()));
    }

    let body = response.bytes().await.map_err(FeedError::Transport)?;
    let feed = RadarFeed::parse(&body)?;

    debug!(
        "Feed parsed: {} past, {} nowcast frames",
        feed.radar.past.len(),
        feed.radar.nowcast.len()
    );
    Ok(feed)
}

/// Request one tile per frame and return the paths whose tiles failed.
///
/// Requests run concurrently, each bounded by `timeout`. The result keeps
/// the order of `frames`.
pub async fn probe_frames(
    client: &reqwest::Client,
    host: &str,
    frames: &[FrameDescriptor],
    options: &DisplayOptions,
    timeout: Duration,
) -> Vec<String> {
    let (zoom, x, y) = PROBE_TILE;
    let mut probes = JoinSet::new();

    for (index, frame) in frames.iter().enumerate() {
        let url = build_tile_url(host, frame, options).resolve(zoom, x, y);
        let request = client.get(&url).timeout(timeout);
        let path = frame.path.clone();

        probes.spawn(async move {
            let ok = match request.send().await {
                Ok(response) => response.status().is_success(),
                Err(e) => {
                    debug!("Probe for {} failed: {}", path, e);
                    false
                }
            };
            (index, path, ok)
        });
    }

    let mut failed = Vec::new();
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok((index, path, false)) => {
                warn!("Radar frame {} is not being served; it will be skipped", path);
                failed.push((index, path));
            }
            Ok(_) => {}
            Err(e) => warn!("Probe task failed: {}", e),
        }
    }

    failed.sort_unstable_by_key(|(index, _)| *index);
    failed.into_iter().map(|(_, path)| path).collect()
}

/// Messages from a background feed load, in delivery order.
#[derive(Debug)]
pub enum FeedEvent {
    /// The feed fetch finished.
    Loaded(Result<RadarFeed, FeedError>),
    /// Nowcast frames whose tiles are not served. Only sent after `Loaded`.
    Unavailable(Vec<String>),
}

/// Background feed fetch.
///
/// The fetch runs on the tokio runtime; the owner polls [`FeedLoader::try_next`]
/// from its own thread. The feed is delivered as soon as it is parsed, and
/// probe results follow separately.
#[derive(Debug)]
pub struct FeedLoader {
    events: Option<mpsc::Receiver<FeedEvent>>,
}

impl FeedLoader {
    /// Spawn the fetch. Must be called from within a tokio runtime.
    ///
    /// When `probe_options` is given, nowcast frames are probed with those
    /// tile options after a successful fetch.
    #[must_use]
    pub fn spawn(client: reqwest::Client, url: String, probe_options: Option<DisplayOptions>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(2);

        tokio::spawn(async move {
            let result = fetch_feed(&client, &url).await;
            let probe = match (&result, probe_options) {
                (Ok(feed), Some(options)) if !feed.radar.nowcast.is_empty() => {
                    Some((feed.host.clone(), feed.radar.nowcast.clone(), options))
                }
                _ => None,
            };

            if event_tx.send(FeedEvent::Loaded(result)).await.is_err() {
                return;
            }
            let Some((host, nowcast, options)) = probe else {
                return;
            };

            let unavailable = probe_frames(&client, &host, &nowcast, &options, PROBE_TIMEOUT).await;
            if !unavailable.is_empty() {
                let _ = event_tx.send(FeedEvent::Unavailable(unavailable)).await;
            }
        });

        Self {
            events: Some(event_rx),
        }
    }

    /// Whether the load task may still deliver events.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.events.is_some()
    }

    /// Take the next event if one has arrived.
    pub fn try_next(&mut self) -> Option<FeedEvent> {
        let rx = self.events.as_mut()?;
        match rx.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                debug!("Feed task finished");
                self.events = None;
                None
            }
        }
    }
}
