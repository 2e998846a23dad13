// Track map rendering

pub mod svg;

pub use svg::{TrackMapConfig, TrackMapGenerator};
