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

//! Frame collection and overlay cache.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// One radar snapshot as listed by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Path segment identifying the frame on the tile host (e.g. `/v2/radar/1755471000`).
    pub path: String,
    /// Unix timestamp in seconds.
    pub time: i64,
}

/// Wrap any index into `[0, len)`.
///
/// `len` must be non-zero.
#[must_use]
pub fn normalize_index(index: i64, len: usize) -> usize {
    debug_assert!(len > 0, "cannot normalize into an empty collection");
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    // rem_euclid is always in [0, len) so the cast back cannot truncate
    usize::try_from(index.rem_euclid(len)).unwrap_or(0)
}

/// Ordered frames plus the per-path overlay cache.
///
/// Overlays are created lazily and kept for the whole session; replacing
/// the frames does not evict them.
#[derive(Debug)]
pub struct FrameStore<O> {
    frames: Vec<FrameDescriptor>,
    overlays: HashMap<String, O>,
    unavailable: HashSet<String>,
}

impl<O> FrameStore<O> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            overlays: HashMap::new(),
            unavailable: HashSet::new(),
        }
    }

    /// Replace the frame collection wholesale.
    pub fn set_frames(&mut self, frames: Vec<FrameDescriptor>) {
        self.frames = frames;
    }

    #[must_use]
    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at a wrapped index, or `None` when the collection is empty.
    #[must_use]
    pub fn frame(&self, index: i64) -> Option<&FrameDescriptor> {
        if self.frames.is_empty() {
            return None;
        }
        self.frames.get(normalize_index(index, self.frames.len()))
    }

    /// Return the cached overlay for the frame's path, creating it on first use.
    pub fn get_or_create_overlay<F>(&mut self, frame: &FrameDescriptor, factory: F) -> &O
    where
        F: FnOnce(&FrameDescriptor) -> O,
    {
        self.overlays
            .entry(frame.path.clone())
            .or_insert_with(|| factory(frame))
    }

    /// Number of overlays created this session.
    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Flag a frame whose tiles cannot be served; stepping skips it.
    pub fn mark_unavailable(&mut self, path: &str) {
        self.unavailable.insert(path.to_string());
    }

    #[must_use]
    pub fn is_available(&self, path: &str) -> bool {
        !self.unavailable.contains(path)
    }
}

impl<O> Default for FrameStore<O> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(path: &str, time: i64) -> FrameDescriptor {
        FrameDescriptor {
            path: path.to_string(),
            time,
        }
    }

    #[test]
    fn test_normalize_wraps() {
        assert_eq!(normalize_index(-1, 5), 4);
        assert_eq!(normalize_index(5, 5), 0);
        assert_eq!(normalize_index(-6, 5), 4);
        assert_eq!(normalize_index(12, 5), 2);
        for k in 0..5 {
            assert_eq!(normalize_index(k, 5), usize::try_from(k).unwrap());
        }
    }

    #[test]
    fn test_normalize_range() {
        for n in 1..8_usize {
            for i in -40..40_i64 {
                assert!(normalize_index(i, n) < n);
            }
        }
        assert!(normalize_index(i64::MIN, 7) < 7);
        assert!(normalize_index(i64::MAX, 7) < 7);
    }

    #[test]
    fn test_frame_lookup() {
        let mut store: FrameStore<u32> = FrameStore::new();
        assert!(store.frame(0).is_none());

        store.set_frames(vec![frame("/a", 1), frame("/b", 2)]);
        assert_eq!(store.frame(0).unwrap().path, "/a");
        assert_eq!(store.frame(-1).unwrap().path, "/b");
        assert_eq!(store.frame(2).unwrap().path, "/a");
    }

    #[test]
    fn test_overlay_created_once_per_path() {
        let mut store: FrameStore<u32> = FrameStore::new();
        let a = frame("/a", 1);
        let mut created = 0;

        let first = *store.get_or_create_overlay(&a, |_| {
            created += 1;
            7
        });
        let second = *store.get_or_create_overlay(&a, |_| {
            created += 1;
            8
        });

        assert_eq!(first, 7);
        assert_eq!(second, 7);
        assert_eq!(created, 1);
        assert_eq!(store.overlay_count(), 1);
    }

    #[test]
    fn test_set_frames_keeps_cache() {
        let mut store: FrameStore<u32> = FrameStore::new();
        let a = frame("/a", 1);
        store.set_frames(vec![a.clone()]);
        store.get_or_create_overlay(&a, |_| 1);

        store.set_frames(vec![frame("/b", 2)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.overlay_count(), 1);
    }

    #[test]
    fn test_unavailable_flag() {
        let mut store: FrameStore<u32> = FrameStore::new();
        assert!(store.is_available("/nowcast/1"));
        store.mark_unavailable("/nowcast/1");
        assert!(!store.is_available("/nowcast/1"));
    }
}
