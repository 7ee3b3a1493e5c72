//! Map rendering and tile sources.
//!
//! This module provides the dark base map and the walkers-backed radar
//! overlay surface driven by the playback session.

pub mod carto;
pub mod radar;

pub use carto::CartoTileSource;
pub use radar::WalkersSurface;
