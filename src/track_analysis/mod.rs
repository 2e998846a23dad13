// Track geometry analysis
// Classifies a closed track polyline into speed zones and detects numbered corners

pub mod corners;
pub mod curvature;

pub use corners::{
    Corner, CornerConfig, CornerDetector, CornerDirection, CornerRun, SeamHandling,
    detect_corners, find_corner_runs,
};
pub use curvature::{
    CurvatureAnalyzer, CurvatureConfig, Segment, SpeedZone, SpeedZoneRun, analyze_curvature,
    speed_zone_labels, speed_zone_runs,
};

/// Minimum number of points needed for a meaningful turning angle
pub const MIN_TRACK_POINTS: usize = 3;
