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

//! Overlay selection and the map surface abstraction.
//!
//! The [`OverlayController`] decides which frame is visible and keeps the
//! map surface showing exactly that frame's overlay. The map library itself
//! sits behind the [`MapSurface`] trait so the controller can be driven by
//! a real tile renderer or by a recording fake in tests.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::frames::{normalize_index, FrameDescriptor, FrameStore};
use crate::url::{build_tile_url, DisplayOptions, TileUrlTemplate};

/// Per-overlay rendering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    /// Layer opacity (0.0 - 1.0).
    pub opacity: f32,
    /// Highest zoom the radar provider serves natively.
    pub max_zoom: u8,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            opacity: 0.6,
            max_zoom: 9,
        }
    }
}

/// The map layer API the controller drives.
///
/// Implementations own no overlays: the frame store keeps every overlay
/// alive and the surface only remembers which one is currently shown.
pub trait MapSurface {
    /// Renderable tile layer bound to one frame.
    type Overlay;

    /// Build a new overlay for the given tile template.
    fn create_overlay(&mut self, template: &TileUrlTemplate, params: &OverlayParams) -> Self::Overlay;

    /// Remove every overlay currently shown.
    fn clear_overlays(&mut self);

    /// Show an overlay on top of the base map.
    fn activate(&mut self, overlay: &Self::Overlay);

    /// Number of overlays currently shown.
    fn active_overlays(&self) -> usize;
}

/// Selects and shows radar frames on a [`MapSurface`].
#[derive(Debug)]
pub struct OverlayController<S> {
    surface: S,
    host: String,
    options: DisplayOptions,
    params: OverlayParams,
    current_index: usize,
}

impl<S: MapSurface> OverlayController<S> {
    pub fn new(surface: S, options: DisplayOptions, params: OverlayParams) -> Self {
        Self {
            surface,
            host: String::new(),
            options,
            params,
            current_index: 0,
        }
    }

    /// Set the tile host received with the feed.
    pub fn set_host(&mut self, host: String) {
        self.host = host;
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Show the frame at `target`, wrapping out-of-range indices.
    ///
    /// Returns the frame now visible, or `None` when there are no frames.
    pub fn display<'a>(
        &mut self,
        store: &'a mut FrameStore<S::Overlay>,
        target: i64,
    ) -> Option<&'a FrameDescriptor> {
        if store.is_empty() {
            return None;
        }

        let index = normalize_index(target, store.len());
        self.current_index = index;
        let frame = store.frames()[index].clone();

        let (surface, host, options, params) =
            (&mut self.surface, &self.host, &self.options, &self.params);
        let overlay = store.get_or_create_overlay(&frame, |frame| {
            let template = build_tile_url(host, frame, options);
            debug!("Creating radar overlay {}", template);
            surface.create_overlay(&template, params)
        });

        surface.clear_overlays();
        surface.activate(overlay);

        store.frames().get(index)
    }

    /// Step `delta` frames from the current one, skipping unavailable frames.
    ///
    /// Falls back to a plain step when no frame is available.
    pub fn step<'a>(
        &mut self,
        store: &'a mut FrameStore<S::Overlay>,
        delta: i64,
    ) -> Option<&'a FrameDescriptor> {
        let len = i64::try_from(store.len()).ok()?;
        let current = i64::try_from(self.current_index).ok()?;

        let target = (1..=len)
            .map(|n| current + delta * n)
            .find(|&candidate| {
                store
                    .frame(candidate)
                    .is_some_and(|frame| store.is_available(&frame.path))
            })
            .unwrap_or(current + delta);

        self.display(store, target)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Surface that records what the controller asked of it.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub created: Vec<String>,
        pub active: Vec<usize>,
        pub opacity: Option<f32>,
    }

    impl MapSurface for RecordingSurface {
        type Overlay = usize;

        fn create_overlay(&mut self, template: &TileUrlTemplate, params: &OverlayParams) -> usize {
            self.created.push(template.to_string());
            self.opacity = Some(params.opacity);
            self.created.len() - 1
        }

        fn clear_overlays(&mut self) {
            self.active.clear();
        }

        fn activate(&mut self, overlay: &usize) {
            self.active.push(*overlay);
        }

        fn active_overlays(&self) -> usize {
            self.active.len()
        }
    }
}
