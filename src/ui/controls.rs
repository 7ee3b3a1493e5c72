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

//! Playback controls: previous, play/stop, next and the status line.

use egui::{Color32, RichText};

/// User request coming from the controls or a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Previous,
    TogglePlay,
    Next,
}

impl ControlAction {
    /// Keyboard shortcut mapping
    pub fn from_key(key: egui::Key) -> Option<Self> {
        match key {
            egui::Key::ArrowLeft => Some(Self::Previous),
            egui::Key::Space => Some(Self::TogglePlay),
            egui::Key::ArrowRight => Some(Self::Next),
            _ => None,
        }
    }
}

const SHORTCUT_KEYS: [egui::Key; 3] = [egui::Key::ArrowLeft, egui::Key::Space, egui::Key::ArrowRight];

/// Floating control bar anchored to the bottom of the map.
#[derive(Debug, Default)]
pub struct PlaybackControls;

impl PlaybackControls {
    /// Render the controls and return the action the user asked for, if any.
    pub fn render(
        &self,
        ctx: &egui::Context,
        playing: bool,
        toggle_label: &str,
        status: &str,
    ) -> Option<ControlAction> {
        let mut action = ctx.input(|input| {
            SHORTCUT_KEYS
                .into_iter()
                .find(|key| input.key_pressed(*key))
                .and_then(ControlAction::from_key)
        });

        egui::Window::new("playback_controls")
            .title_bar(false)
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
            .resizable(false)
            .collapsible(false)
            .frame(egui::Frame::window(&ctx.style())
                .fill(Color32::from_rgba_unmultiplied(25, 30, 35, 220))
                .stroke(egui::Stroke::new(1.0, Color32::from_rgb(60, 80, 100)))
                .corner_radius(6.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button(RichText::new("◀").size(14.0))
                        .on_hover_text("Previous frame (←)")
                        .clicked() {
                        action = Some(ControlAction::Previous);
                    }

                    let toggle_icon = if playing { "⏸" } else { "▶" };
                    if ui.button(RichText::new(format!("{toggle_icon} {toggle_label}")).size(14.0))
                        .on_hover_text("Play / stop (space)")
                        .clicked() {
                        action = Some(ControlAction::TogglePlay);
                    }

                    if ui.button(RichText::new("▶").size(14.0))
                        .on_hover_text("Next frame (→)")
                        .clicked() {
                        action = Some(ControlAction::Next);
                    }

                    ui.add_space(8.0);
                    ui.label(RichText::new(status)
                        .color(Color32::from_rgb(200, 220, 255))
                        .size(13.0)
                        .monospace());
                });
            });

        action
    }
}
