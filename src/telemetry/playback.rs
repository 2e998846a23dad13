use serde::Serialize;

use super::TelemetrySample;
use crate::geometry::TrackPoint;

/// Telemetry samples advanced per animation tick
pub const PLAYBACK_STEP: f64 = 1.5;
/// How far a trailing car runs behind, as a fraction of the lap
pub const GHOST_GAP_FRACTION: f64 = 0.05;

/// Car state to draw for one tick
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlaybackFrame {
    pub telemetry_index: usize,
    pub sample: TelemetrySample,
    pub track_index: usize,
    pub point: TrackPoint,
}

/// Replays a lap of telemetry along a track.
///
/// The cursor is fractional so the replay can run slower or faster than one
/// sample per tick; frames always use the sample at the floor of the cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct LapPlayback {
    cursor: f64,
    step: f64,
}

impl LapPlayback {
    pub fn new() -> Self {
        Self::with_step(PLAYBACK_STEP)
    }

    pub fn with_step(step: f64) -> Self {
        Self { cursor: 0.0, step }
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Move forward one tick
    pub fn advance(&mut self) {
        self.cursor += self.step;
    }

    pub fn reset(&mut self) {
        self.cursor = 0.0;
    }

    /// Completed laps for a lap of `samples_len` samples
    pub fn laps_completed(&self, samples_len: usize) -> usize {
        if samples_len == 0 {
            return 0;
        }
        self.cursor.floor() as usize / samples_len
    }

    /// Frame at the cursor, `None` without samples or coordinates
    pub fn frame(
        &self,
        samples: &[TelemetrySample],
        coords: &[TrackPoint],
    ) -> Option<PlaybackFrame> {
        if samples.is_empty() {
            return None;
        }
        let index = self.cursor.floor() as usize % samples.len();
        frame_at(index, samples, coords)
    }

    /// Frame of a car trailing the cursor by 5% of the lap, at least one sample
    pub fn ghost_frame(
        &self,
        samples: &[TelemetrySample],
        coords: &[TrackPoint],
    ) -> Option<PlaybackFrame> {
        if samples.is_empty() {
            return None;
        }
        let len = samples.len();
        let gap = ((len as f64 * GHOST_GAP_FRACTION).floor() as usize).max(1) % len;
        let index = (self.cursor.floor() as usize % len + len - gap) % len;
        frame_at(index, samples, coords)
    }
}

impl Default for LapPlayback {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_at(
    telemetry_index: usize,
    samples: &[TelemetrySample],
    coords: &[TrackPoint],
) -> Option<PlaybackFrame> {
    if coords.is_empty() {
        return None;
    }
    let progress = telemetry_index as f64 / samples.len() as f64;
    let track_index = (progress * coords.len() as f64).floor() as usize % coords.len();
    Some(PlaybackFrame {
        telemetry_index,
        sample: samples[telemetry_index],
        track_index,
        point: coords[track_index],
    })
}
