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

//! Fixed-cadence animation timer.
//!
//! While playing, a background tokio task ticks every frame interval and
//! pushes a unit message per tick. The owner drains ticks on its own
//! thread. At most one tick is buffered, so a stalled owner never sees a
//! burst of frames when it resumes.

use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Default delay between animation frames.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(500);

const TICK_BUFFER: usize = 1;

/// Animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Stopped,
    Playing,
}

impl AnimationState {
    /// Label for the play/stop toggle: the action it would perform.
    #[must_use]
    pub fn toggle_label(self) -> &'static str {
        match self {
            AnimationState::Stopped => "Play",
            AnimationState::Playing => "Stop",
        }
    }
}

#[derive(Debug)]
struct Ticker {
    ticks: mpsc::Receiver<()>,
    cancel_token: CancellationToken,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Drives the repeating frame timer.
///
/// The ticker exists iff the driver is playing. `start` and `stop` are
/// no-ops when already in the target state.
#[derive(Debug)]
pub struct AnimationDriver {
    frame_interval: Duration,
    ticker: Option<Ticker>,
    timers_started: u64,
}

impl AnimationDriver {
    #[must_use]
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            ticker: None,
            timers_started: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> AnimationState {
        if self.ticker.is_some() {
            AnimationState::Playing
        } else {
            AnimationState::Stopped
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.ticker.is_some()
    }

    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Total number of timers spawned over the driver's life.
    #[must_use]
    pub fn timers_started(&self) -> u64 {
        self.timers_started
    }

    /// Begin ticking. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }

        let (tick_tx, tick_rx) = mpsc::channel(TICK_BUFFER);
        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();
        let period = self.frame_interval;

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = task_cancel.cancelled() => break,
                    _ = interval.tick() => {
                        // Full means the previous tick is still unread.
                        if let Err(mpsc::error::TrySendError::Closed(())) = tick_tx.try_send(()) {
                            break;
                        }
                    }
                }
            }
            debug!("Animation ticker exited");
        });

        self.timers_started += 1;
        self.ticker = Some(Ticker {
            ticks: tick_rx,
            cancel_token,
        });
        info!("Animation started ({:?} per frame)", period);
    }

    /// Stop ticking.
    pub fn stop(&mut self) {
        if self.ticker.take().is_some() {
            info!("Animation stopped");
        }
    }

    /// Start when stopped, stop when playing.
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Number of ticks received since the last call.
    pub fn drain_ticks(&mut self) -> usize {
        let Some(ticker) = self.ticker.as_mut() else {
            return 0;
        };

        let mut count = 0;
        while ticker.ticks.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_label() {
        assert_eq!(AnimationState::Stopped.toggle_label(), "Play");
        assert_eq!(AnimationState::Playing.toggle_label(), "Stop");
    }

    #[test]
    fn test_stop_when_stopped_is_noop() {
        let mut driver = AnimationDriver::default();
        driver.stop();
        assert_eq!(driver.state(), AnimationState::Stopped);
        assert_eq!(driver.timers_started(), 0);
        assert_eq!(driver.drain_ticks(), 0);
    }

    #[tokio::test]
    async fn test_double_start_keeps_one_timer() {
        let mut driver = AnimationDriver::default();
        driver.start();
        driver.start();

        assert_eq!(driver.state(), AnimationState::Playing);
        assert_eq!(driver.timers_started(), 1);

        driver.stop();
        assert_eq!(driver.state(), AnimationState::Stopped);
        driver.start();
        assert_eq!(driver.timers_started(), 2);
    }

    #[tokio::test]
    async fn test_toggle_switches_state() {
        let mut driver = AnimationDriver::default();
        driver.toggle();
        assert!(driver.is_playing());
        driver.toggle();
        assert!(!driver.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_arrive_at_interval() {
        let mut driver = AnimationDriver::new(Duration::from_millis(500));
        driver.start();

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(driver.drain_ticks(), 0);

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(driver.drain_ticks() >= 1);

        driver.stop();
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(driver.drain_ticks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_ticks_do_not_accumulate() {
        let mut driver = AnimationDriver::new(Duration::from_millis(500));
        driver.start();

        tokio::time::sleep(Duration::from_millis(5_200)).await;
        assert_eq!(driver.drain_ticks(), 1);
        assert_eq!(driver.drain_ticks(), 0);
    }
}
