// Aligns telemetry traces with track coordinates

use std::collections::HashMap;

use log::{debug, error, warn};

use super::TelemetrySample;
use crate::geometry::{TrackPoint, distance};
use crate::track_data::TrackSource;

/// Index of the track point closest to `point`.
///
/// Ties resolve to the lowest index. A track without coordinates yields 0,
/// which callers cannot tell apart from a genuine match on the first point.
pub fn map_to_track(coords: &[TrackPoint], point: &TrackPoint) -> usize {
    if coords.is_empty() {
        error!("Cannot map telemetry point onto a track without coordinates");
        return 0;
    }

    let mut closest_index = 0;
    let mut min_distance = f64::INFINITY;
    for (i, coord) in coords.iter().enumerate() {
        let d = distance(coord, point);
        if d < min_distance {
            min_distance = d;
            closest_index = i;
        }
    }
    closest_index
}

/// Linearly resample a telemetry trace to `target_points` samples.
///
/// Speed, throttle and brake are blended between the two nearest source
/// samples; gear is taken from whichever of the two is closer.
pub fn interpolate(samples: &[TelemetrySample], target_points: usize) -> Vec<TelemetrySample> {
    if samples.is_empty() || target_points == 0 {
        return Vec::new();
    }
    if samples.len() == target_points {
        return samples.to_vec();
    }
    if target_points == 1 {
        return vec![samples[0]];
    }

    let last = samples.len() - 1;
    let ratio = last as f64 / (target_points - 1) as f64;

    (0..target_points)
        .map(|i| {
            let index = i as f64 * ratio;
            let lower = (index.floor() as usize).min(last);
            let upper = (index.ceil() as usize).min(last);
            let fraction = index - lower as f64;

            if lower == upper {
                return samples[lower];
            }

            let (a, b) = (&samples[lower], &samples[upper]);
            let blend = |from: u32, to: u32| -> u32 {
                (from as f64 * (1.0 - fraction) + to as f64 * fraction).round() as u32
            };
            TelemetrySample {
                speed: blend(a.speed, b.speed),
                throttle: blend(a.throttle, b.throttle),
                brake: blend(a.brake, b.brake),
                gear: if fraction < 0.5 { a.gear } else { b.gear },
            }
        })
        .collect()
}

/// Resample a telemetry trace to one sample per track point
pub fn normalize_to_track(
    coords: &[TrackPoint],
    samples: &[TelemetrySample],
) -> Vec<TelemetrySample> {
    interpolate(samples, coords.len())
}

/// Cumulative distance along the track from the first point.
///
/// The closing segment from the last point back to the first is not included.
pub fn calculate_distances(coords: &[TrackPoint]) -> Vec<f64> {
    if coords.is_empty() {
        return Vec::new();
    }

    let mut total = 0.0;
    std::iter::once(0.0)
        .chain(coords.windows(2).map(|pair| {
            total += distance(&pair[0], &pair[1]);
            total
        }))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LookupKey {
    track_key: String,
    x_bits: u64,
    y_bits: u64,
}

impl LookupKey {
    fn new(track_key: &str, point: &TrackPoint) -> Self {
        Self {
            track_key: track_key.to_string(),
            x_bits: point.x.to_bits(),
            y_bits: point.y.to_bits(),
        }
    }
}

/// Maps telemetry onto tracks held by a [`TrackSource`].
///
/// Nearest point lookups are memoised per track key. The cache is never
/// invalidated on its own: call [`TelemetryMapper::clear_cache`] when the
/// underlying track data changes.
#[derive(Debug, Default)]
pub struct TelemetryMapper {
    cache: HashMap<LookupKey, usize>,
}

impl TelemetryMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest point on the track `track_key`, or 0 when it is not loaded
    pub fn map_to_track_key<S: TrackSource + ?Sized>(
        &mut self,
        tracks: &S,
        track_key: &str,
        point: &TrackPoint,
    ) -> usize {
        let lookup = LookupKey::new(track_key, point);
        if let Some(index) = self.cache.get(&lookup) {
            return *index;
        }

        let track = match tracks.track(track_key) {
            Ok(track) => track,
            Err(e) => {
                error!("Track not found: {} ({})", track_key, e);
                return 0;
            }
        };

        let index = map_to_track(&track.coordinates, point);
        self.cache.insert(lookup, index);
        index
    }

    /// Resample `samples` to the point count of `track_key`.
    ///
    /// Returns the samples unchanged when the track is not loaded.
    pub fn normalize_to_track_key<S: TrackSource + ?Sized>(
        &self,
        tracks: &S,
        track_key: &str,
        samples: &[TelemetrySample],
    ) -> Vec<TelemetrySample> {
        match tracks.track(track_key) {
            Ok(track) => {
                debug!(
                    "Normalizing {} telemetry samples to {} points of {}",
                    samples.len(),
                    track.coordinates.len(),
                    track.name
                );
                normalize_to_track(&track.coordinates, samples)
            }
            Err(e) => {
                warn!("Leaving telemetry unaligned: {}", e);
                samples.to_vec()
            }
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
