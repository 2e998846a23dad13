use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use super::MIN_TRACK_POINTS;
use crate::geometry::{TrackPoint, windowed_turn_angle};

/// Points to look behind and ahead when measuring the turning angle
pub const DEFAULT_CURVATURE_WINDOW: usize = 5;
/// Angles below this are straights or very gentle curves (degrees)
pub const HIGH_SPEED_MAX_ANGLE: f64 = 5.0;
/// Angles below this are fast corners; anything above is a tight corner (degrees)
pub const MEDIUM_SPEED_MAX_ANGLE: f64 = 15.0;
/// Zone runs need more points than this to receive a label
pub const DEFAULT_LABEL_MIN_LEN: usize = 20;

/// Coarse classification of expected vehicle speed at a track point
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SpeedZone {
    High,
    Medium,
    Low,
}

impl SpeedZone {
    pub fn from_angle(angle: f64, config: &CurvatureConfig) -> Self {
        if angle < config.high_speed_max_angle {
            SpeedZone::High
        } else if angle < config.medium_speed_max_angle {
            SpeedZone::Medium
        } else {
            SpeedZone::Low
        }
    }

    /// Track colour used when rendering the zone
    pub fn color(&self) -> &'static str {
        match self {
            SpeedZone::High => "#FFD700",
            SpeedZone::Medium => "#FF8C00",
            SpeedZone::Low => "#FF3333",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeedZone::High => "HIGH SPEED",
            SpeedZone::Medium => "MEDIUM SPEED",
            SpeedZone::Low => "LOW SPEED",
        }
    }
}

/// Classified track point, one per input coordinate
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub point: TrackPoint,
    /// Turning angle in degrees (0-180)
    pub angle: f64,
    pub speed_zone: SpeedZone,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CurvatureConfig {
    pub window: usize,
    pub high_speed_max_angle: f64,
    pub medium_speed_max_angle: f64,
}

impl Default for CurvatureConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_CURVATURE_WINDOW,
            high_speed_max_angle: HIGH_SPEED_MAX_ANGLE,
            medium_speed_max_angle: MEDIUM_SPEED_MAX_ANGLE,
        }
    }
}

pub struct CurvatureAnalyzer {
    config: CurvatureConfig,
}

impl CurvatureAnalyzer {
    pub fn new() -> Self {
        Self {
            config: CurvatureConfig::default(),
        }
    }

    pub fn with_config(config: CurvatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CurvatureConfig {
        &self.config
    }

    /// Classify every point of a closed track into a speed zone.
    ///
    /// Returns an empty list when the track has fewer than three points.
    pub fn analyze(&self, coords: &[TrackPoint]) -> Vec<Segment> {
        if coords.len() < MIN_TRACK_POINTS {
            debug!(
                "Skipping curvature analysis, only {} points",
                coords.len()
            );
            return Vec::new();
        }

        coords
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let angle = windowed_turn_angle(coords, i, self.config.window);
                Segment {
                    point: *point,
                    angle,
                    speed_zone: SpeedZone::from_angle(angle, &self.config),
                }
            })
            .collect()
    }
}

impl Default for CurvatureAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify `coords` with the default angle thresholds and the given window
pub fn analyze_curvature(coords: &[TrackPoint], window: usize) -> Vec<Segment> {
    CurvatureAnalyzer::with_config(CurvatureConfig {
        window,
        ..Default::default()
    })
    .analyze(coords)
}

/// Consecutive segments sharing a speed zone
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SpeedZoneRun {
    pub zone: SpeedZone,
    pub start: usize,
    pub len: usize,
}

impl SpeedZoneRun {
    pub fn center(&self) -> usize {
        self.start + self.len / 2
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Group consecutive segments of the same zone, in track order
pub fn speed_zone_runs(segments: &[Segment]) -> Vec<SpeedZoneRun> {
    let mut start = 0;
    segments
        .iter()
        .chunk_by(|segment| segment.speed_zone)
        .into_iter()
        .map(|(zone, group)| {
            let len = group.count();
            let run = SpeedZoneRun { zone, start, len };
            start += len;
            run
        })
        .collect()
}

/// Zone runs long enough to carry a label, with the index to anchor it on
pub fn speed_zone_labels(segments: &[Segment], min_len: usize) -> Vec<(SpeedZone, usize)> {
    speed_zone_runs(segments)
        .into_iter()
        .filter(|run| run.len > min_len)
        .map(|run| (run.zone, run.center()))
        .collect()
}
