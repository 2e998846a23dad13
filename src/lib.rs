// Library interface for trackviz
// This allows integration tests and benches to access internal modules

pub mod config;
pub mod errors;
pub mod geometry;
pub mod telemetry;
pub mod track_analysis;
pub mod track_data;
pub mod track_map;

// Re-export commonly used types
pub use config::TrackVizConfig;
pub use errors::TrackVizError;
pub use geometry::TrackPoint;
pub use telemetry::{TelemetryMapper, TelemetrySample, TelemetrySynthesizer};
pub use track_analysis::{Corner, CornerDetector, CurvatureAnalyzer, Segment, SpeedZone};
pub use track_data::{Track, TrackLoader, TrackSource};
pub use track_map::TrackMapGenerator;
