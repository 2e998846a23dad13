use log::debug;
use serde::{Deserialize, Serialize};

use super::MIN_TRACK_POINTS;
use crate::geometry::{TrackPoint, windowed_heading_change, windowed_turn_angle};

/// Turning angle a point must exceed to be part of a corner (degrees)
pub const DEFAULT_CORNER_THRESHOLD: f64 = 12.0;
/// Points to look behind and ahead when measuring the turning angle
pub const DEFAULT_CORNER_WINDOW: usize = 8;

/// What to do with a corner that is still open when the scan reaches the
/// start/finish line.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SeamHandling {
    /// Single pass over the points; an open corner at the end of the lap is dropped
    #[default]
    Truncate,
    /// Start the scan at the first straight point so a corner spanning the
    /// start/finish line is closed like any other
    Close,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CornerConfig {
    pub threshold: f64,
    pub window: usize,
    pub seam_handling: SeamHandling,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CORNER_THRESHOLD,
            window: DEFAULT_CORNER_WINDOW,
            seam_handling: SeamHandling::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CornerDirection {
    /// Counter-clockwise turn in a y-up frame
    Left,
    /// Clockwise turn in a y-up frame
    Right,
}

impl CornerDirection {
    pub fn from_heading_change(change: f64) -> Self {
        if change >= 0.0 {
            CornerDirection::Left
        } else {
            CornerDirection::Right
        }
    }
}

/// A contiguous run of above-threshold points in the turning-angle signal
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CornerRun {
    /// Index of the first point in the run
    pub start: usize,
    /// Number of points in the run
    pub len: usize,
    /// Index of the apex, `floor(len / 2)` points into the run
    pub apex: usize,
    /// Largest turning angle seen in the run (degrees)
    pub peak_angle: f64,
}

/// A numbered corner on the track
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    /// Sequential number in traversal order, starting at 1
    pub number: u32,
    /// Apex position
    pub position: TrackPoint,
    /// Number of track points in the corner
    pub points: usize,
    pub start_index: usize,
    pub apex_index: usize,
    pub peak_angle: f64,
    pub direction: CornerDirection,
}

struct RunBuilder {
    start: usize,
    len: usize,
    peak_angle: f64,
}

impl RunBuilder {
    fn finish(self, n: usize) -> CornerRun {
        CornerRun {
            start: self.start,
            len: self.len,
            apex: (self.start + self.len / 2) % n,
            peak_angle: self.peak_angle,
        }
    }
}

/// Scan a circular turning-angle signal for runs of points above `threshold`.
///
/// Runs are returned in traversal order of their apex.
pub fn find_corner_runs(angles: &[f64], threshold: f64, seam: SeamHandling) -> Vec<CornerRun> {
    let n = angles.len();
    if n == 0 {
        return Vec::new();
    }

    let scan_start = match seam {
        SeamHandling::Truncate => 0,
        SeamHandling::Close => match angles.iter().position(|angle| *angle <= threshold) {
            Some(index) => index,
            // one sustained turn around the whole loop has no entry or exit
            None => return Vec::new(),
        },
    };

    let mut runs = Vec::new();
    let mut current: Option<RunBuilder> = None;

    for offset in 0..n {
        let i = (scan_start + offset) % n;
        let angle = angles[i];

        if angle > threshold {
            match current.as_mut() {
                Some(run) => {
                    run.len += 1;
                    run.peak_angle = run.peak_angle.max(angle);
                }
                None => {
                    current = Some(RunBuilder {
                        start: i,
                        len: 1,
                        peak_angle: angle,
                    })
                }
            }
        } else if let Some(run) = current.take() {
            runs.push(run.finish(n));
        }
    }

    if let Some(run) = current {
        match seam {
            SeamHandling::Truncate => debug!(
                "Dropping corner run of {} points still open at the start/finish line",
                run.len
            ),
            // the scan started on a straight point, which closes this run
            SeamHandling::Close => runs.push(run.finish(n)),
        }
    }

    runs.sort_by_key(|run| run.apex);
    runs
}

pub struct CornerDetector {
    config: CornerConfig,
}

impl CornerDetector {
    pub fn new() -> Self {
        Self {
            config: CornerConfig::default(),
        }
    }

    pub fn with_config(config: CornerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CornerConfig {
        &self.config
    }

    /// Turning angle of every point using the detector's window
    pub fn turn_angles(&self, coords: &[TrackPoint]) -> Vec<f64> {
        (0..coords.len())
            .map(|i| windowed_turn_angle(coords, i, self.config.window))
            .collect()
    }

    /// Detect the corners of a closed track, numbered from 1 in traversal order.
    ///
    /// Returns an empty list when the track has fewer than three points.
    pub fn detect(&self, coords: &[TrackPoint]) -> Vec<Corner> {
        if coords.len() < MIN_TRACK_POINTS {
            return Vec::new();
        }

        let angles = self.turn_angles(coords);
        let corners: Vec<Corner> =
            find_corner_runs(&angles, self.config.threshold, self.config.seam_handling)
                .into_iter()
                .zip(1..)
                .map(|(run, number)| Corner {
                    number,
                    position: coords[run.apex],
                    points: run.len,
                    start_index: run.start,
                    apex_index: run.apex,
                    peak_angle: run.peak_angle,
                    direction: CornerDirection::from_heading_change(windowed_heading_change(
                        coords,
                        run.apex,
                        self.config.window,
                    )),
                })
                .collect();

        debug!(
            "Detected {} corners on a {} point track",
            corners.len(),
            coords.len()
        );
        corners
    }
}

impl Default for CornerDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect corners with the start/finish line truncation of a single pass
pub fn detect_corners(coords: &[TrackPoint], threshold: f64, window: usize) -> Vec<Corner> {
    CornerDetector::with_config(CornerConfig {
        threshold,
        window,
        seam_handling: SeamHandling::Truncate,
    })
    .detect(coords)
}
