//! UI components for Radar Loop.
//!
//! This module contains the floating playback controls.

pub mod controls;

pub use controls::{ControlAction, PlaybackControls};
