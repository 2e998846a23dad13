// Track data management module
// Loads circuit polylines and the track index from a data directory

pub mod loader;
pub mod types;

pub use loader::{TrackLoader, TrackLoaderStats, TrackSource};
pub use types::{Track, TrackIndex, TrackIndexEntry, TrackLength};
