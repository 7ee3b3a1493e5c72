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

//! Radar playback session.
//!
//! A [`Session`] owns every piece of mutable playback state: the frame
//! store and its overlay cache, the overlay controller and the map surface
//! it drives, the animation timer, and the status text shown to the user.
//! All methods are synchronous and meant to be called from one thread; the
//! UI layer forwards button clicks, timer ticks and feed completion here.

use std::fmt;
use std::time::Duration;

use chrono::{Local, TimeZone};
use log::{error, info, warn};

use crate::animation::{AnimationDriver, AnimationState, DEFAULT_FRAME_INTERVAL};
use crate::feed::{fetch_feed, FeedError, FeedEvent, RadarFeed};
use crate::frames::{FrameDescriptor, FrameStore};
use crate::overlay::{MapSurface, OverlayController, OverlayParams};
use crate::url::DisplayOptions;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Status line shown next to the playback controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusText {
    #[default]
    Idle,
    Loading,
    /// Local time of the visible frame.
    Frame(String),
    NoData,
    Error,
}

impl fmt::Display for StatusText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusText::Idle => Ok(()),
            StatusText::Loading => f.write_str("Loading…"),
            StatusText::Frame(time) => f.write_str(time),
            StatusText::NoData => f.write_str("No data"),
            StatusText::Error => f.write_str("Error loading data"),
        }
    }
}

/// Snapshot of the playback position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
}

/// Fixed session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub display: DisplayOptions,
    pub overlay: OverlayParams,
    pub frame_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display: DisplayOptions::default(),
            overlay: OverlayParams::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Format a frame timestamp in the local time zone.
#[must_use]
pub fn format_frame_time(time: i64) -> String {
    format_frame_time_in(time, &Local)
}

/// Format a frame timestamp in the given time zone.
#[must_use]
pub fn format_frame_time_in<Tz>(time: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match tz.timestamp_opt(time, 0).single() {
        Some(datetime) => datetime.format(TIME_FORMAT).to_string(),
        None => time.to_string(),
    }
}

/// Playback session over one map surface.
pub struct Session<S: MapSurface> {
    store: FrameStore<S::Overlay>,
    controller: OverlayController<S>,
    driver: AnimationDriver,
    status: StatusText,
}

impl<S: MapSurface> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("frames", &self.store.len())
            .field("overlays", &self.store.overlay_count())
            .field("current_index", &self.controller.current_index())
            .field("driver", &self.driver)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<S: MapSurface> Session<S> {
    pub fn new(surface: S, config: SessionConfig) -> Self {
        Self {
            store: FrameStore::new(),
            controller: OverlayController::new(surface, config.display, config.overlay),
            driver: AnimationDriver::new(config.frame_interval),
            status: StatusText::Idle,
        }
    }

    #[must_use]
    pub fn status(&self) -> &StatusText {
        &self.status
    }

    #[must_use]
    pub fn frames(&self) -> &[FrameDescriptor] {
        self.store.frames()
    }

    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.store.overlay_count()
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        self.controller.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.controller.surface_mut()
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.controller.host()
    }

    #[must_use]
    pub fn playback(&self) -> PlaybackState {
        PlaybackState {
            current_index: self.controller.current_index(),
            is_playing: self.driver.is_playing(),
        }
    }

    #[must_use]
    pub fn animation_state(&self) -> AnimationState {
        self.driver.state()
    }

    #[must_use]
    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    /// Label for the play/stop control.
    #[must_use]
    pub fn toggle_label(&self) -> &'static str {
        self.driver.state().toggle_label()
    }

    /// Show the frame at `target` (wrapping). No-op before frames are loaded.
    pub fn display(&mut self, target: i64) {
        if let Some(frame) = self.controller.display(&mut self.store, target) {
            self.status = StatusText::Frame(format_frame_time(frame.time));
        }
    }

    /// Show the next available frame.
    pub fn advance(&mut self) {
        if let Some(frame) = self.controller.step(&mut self.store, 1) {
            self.status = StatusText::Frame(format_frame_time(frame.time));
        }
    }

    /// Show the previous available frame.
    pub fn retreat(&mut self) {
        if let Some(frame) = self.controller.step(&mut self.store, -1) {
            self.status = StatusText::Frame(format_frame_time(frame.time));
        }
    }

    /// Start the animation. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.driver.start();
    }

    pub fn stop(&mut self) {
        self.driver.stop();
    }

    /// Play/stop toggle. Must be called from within a tokio runtime.
    pub fn toggle(&mut self) {
        self.driver.toggle();
    }

    /// Advance one frame if the timer has ticked since the last poll.
    ///
    /// Ticks that piled up while nobody polled collapse into one step.
    /// Returns whether a frame was advanced.
    pub fn poll(&mut self) -> bool {
        if self.driver.drain_ticks() == 0 {
            return false;
        }
        self.advance();
        true
    }

    /// Mark the session as waiting for the feed.
    pub fn set_loading(&mut self) {
        self.status = StatusText::Loading;
    }

    /// Apply a finished feed fetch.
    ///
    /// Errors leave the current frames untouched. An empty feed clears the
    /// frames and shows "No data"; otherwise the latest past frame is shown.
    pub fn apply_feed(&mut self, result: Result<RadarFeed, FeedError>) {
        let feed = match result {
            Ok(feed) => feed,
            Err(e) => {
                error!("Failed to load radar feed: {}", e);
                self.status = StatusText::Error;
                return;
            }
        };

        self.controller.set_host(feed.host.clone());
        self.store.set_frames(feed.frames());

        let Some(latest) = feed.latest_past_index() else {
            warn!("Radar feed contains no frames");
            self.status = StatusText::NoData;
            return;
        };

        info!(
            "Loaded {} radar frames ({} past, {} nowcast)",
            self.store.len(),
            feed.radar.past.len(),
            feed.radar.nowcast.len()
        );
        self.display(i64::try_from(latest).unwrap_or_default());
    }

    /// Exclude frames from stepping and animation.
    pub fn mark_unavailable(&mut self, paths: &[String]) {
        for path in paths {
            self.store.mark_unavailable(path);
        }
        info!("{} forecast frames unavailable", paths.len());
    }

    /// Apply one event from a background [`FeedLoader`](crate::FeedLoader).
    pub fn apply_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Loaded(result) => self.apply_feed(result),
            FeedEvent::Unavailable(paths) => self.mark_unavailable(&paths),
        }
    }

    /// Fetch the feed and apply it.
    pub async fn load(&mut self, client: &reqwest::Client, url: &str) {
        self.set_loading();
        let result = fetch_feed(client, url).await;
        self.apply_feed(result);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::feed::RadarFrames;
    use crate::overlay::testing::RecordingSurface;

    fn frame(path: &str, time: i64) -> FrameDescriptor {
        FrameDescriptor {
            path: path.to_string(),
            time,
        }
    }

    fn feed(past: Vec<FrameDescriptor>, nowcast: Vec<FrameDescriptor>) -> RadarFeed {
        RadarFeed {
            host: "https://tiles.example".to_string(),
            radar: RadarFrames { past, nowcast },
        }
    }

    fn session() -> Session<RecordingSurface> {
        Session::new(RecordingSurface::default(), SessionConfig::default())
    }

    #[test]
    fn test_format_frame_time_utc() {
        assert_eq!(format_frame_time_in(1_755_471_000, &Utc), "2025-08-17 22:50:00");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(StatusText::NoData.to_string(), "No data");
        assert_eq!(StatusText::Error.to_string(), "Error loading data");
        assert_eq!(StatusText::Frame("x".to_string()).to_string(), "x");
    }

    #[test]
    fn test_display_before_load_is_noop() {
        let mut session = session();
        session.display(0);
        session.advance();
        session.retreat();
        assert_eq!(session.status(), &StatusText::Idle);
        assert_eq!(session.surface().active_overlays(), 0);
    }

    #[test]
    fn test_apply_feed_shows_latest_past() {
        let mut session = session();
        session.apply_feed(Ok(feed(
            vec![frame("/a", 100), frame("/b", 200)],
            vec![frame("/c", 300)],
        )));

        assert_eq!(session.frames().len(), 3);
        assert_eq!(session.playback().current_index, 1);
        assert_eq!(session.status(), &StatusText::Frame(format_frame_time(200)));
        assert_eq!(session.surface().active_overlays(), 1);
        assert_eq!(session.host(), "https://tiles.example");
    }

    #[test]
    fn test_apply_empty_feed() {
        let mut session = session();
        session.apply_feed(Ok(feed(Vec::new(), Vec::new())));

        assert!(session.frames().is_empty());
        assert_eq!(session.status(), &StatusText::NoData);
        assert_eq!(session.surface().active_overlays(), 0);
    }

    #[test]
    fn test_apply_error_keeps_frames() {
        let mut session = session();
        session.apply_feed(Ok(feed(vec![frame("/a", 100)], Vec::new())));

        session.apply_feed(Err(FeedError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)));

        assert_eq!(session.status(), &StatusText::Error);
        assert_eq!(session.frames(), &[frame("/a", 100)]);
    }

    #[test]
    fn test_advance_and_retreat_wrap() {
        let mut session = session();
        session.apply_feed(Ok(feed(
            vec![frame("/a", 100), frame("/b", 200)],
            vec![frame("/c", 300)],
        )));

        session.advance();
        assert_eq!(session.playback().current_index, 2);
        session.advance();
        assert_eq!(session.playback().current_index, 0);
        session.retreat();
        assert_eq!(session.playback().current_index, 2);
        assert_eq!(session.status(), &StatusText::Frame(format_frame_time(300)));
        assert_eq!(session.overlay_count(), 3);
    }

    #[test]
    fn test_unavailable_after_load_is_skipped() {
        let mut session = session();
        session.apply_event(FeedEvent::Loaded(Ok(feed(
            vec![frame("/a", 100), frame("/b", 200)],
            vec![frame("/c", 300)],
        ))));
        assert_eq!(session.playback().current_index, 1);

        session.apply_event(FeedEvent::Unavailable(vec!["/c".to_string()]));
        session.advance();
        assert_eq!(session.playback().current_index, 0);
    }

    #[test]
    fn test_other_feed_shapes_report_no_data() {
        let bodies: [&[u8]; 4] = [
            br#"{"radar":{"past":null,"nowcast":null}}"#,
            br#"{"host":"h","radar":null}"#,
            br#"{"host":null,"radar":{}}"#,
            br#"{"radar":"unavailable"}"#,
        ];

        for body in bodies {
            let mut session = session();
            session.apply_feed(RadarFeed::parse(body));
            assert_eq!(session.status().to_string(), "No data");
        }
    }

    #[test]
    fn test_reload_reuses_overlays_for_same_paths() {
        let mut session = session();
        session.apply_feed(Ok(feed(vec![frame("/a", 100)], Vec::new())));
        session.apply_feed(Ok(feed(vec![frame("/a", 100)], Vec::new())));
        assert_eq!(session.overlay_count(), 1);
        assert_eq!(session.surface().created.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_label_follows_state() {
        let mut session = session();
        assert_eq!(session.toggle_label(), "Play");
        session.start();
        session.start();
        assert_eq!(session.toggle_label(), "Stop");
        assert_eq!(session.driver().timers_started(), 1);
        session.toggle();
        assert_eq!(session.toggle_label(), "Play");
        assert!(!session.playback().is_playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_advances_on_tick() {
        let mut session = session();
        session.apply_feed(Ok(feed(
            vec![frame("/a", 100), frame("/b", 200)],
            vec![frame("/c", 300)],
        )));
        session.start();
        assert!(!session.poll());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(session.poll());

        assert_eq!(session.playback().current_index, 2);
        assert_eq!(session.surface().active_overlays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_ticks_advance_one_frame() {
        let mut session = session();
        session.apply_feed(Ok(feed(
            vec![frame("/a", 100), frame("/b", 200), frame("/c", 300)],
            vec![frame("/d", 400), frame("/e", 500)],
        )));
        session.start();

        // Eight intervals with nobody polling.
        tokio::time::sleep(Duration::from_millis(4_100)).await;
        assert!(session.poll());
        assert_eq!(session.playback().current_index, 3);
        assert!(!session.poll());
        assert_eq!(session.playback().current_index, 3);
    }
}
