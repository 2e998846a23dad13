use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::synthesizer::TelemetrySynthesizer;
use super::{RawTelemetrySample, TelemetrySample, TelemetryStats, normalize_to_track};
use crate::TrackVizError;
use crate::geometry::TrackPoint;

/// Where a recorded lap came from
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TelemetryMetadata {
    pub driver: String,
    pub team: String,
    pub gp: String,
    pub year: Option<u32>,
    pub session: String,
}

/// Contents of a `real_telemetry_<key>.json` file
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RealTelemetryFile {
    #[serde(default)]
    pub metadata: TelemetryMetadata,
    #[serde(default)]
    pub telemetry: Vec<RawTelemetrySample>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum TelemetrySource {
    Real(TelemetryMetadata),
    Simulated,
}

/// A lap of telemetry with one sample per track point
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LapTelemetry {
    pub source: TelemetrySource,
    pub samples: Vec<TelemetrySample>,
}

impl LapTelemetry {
    pub fn is_real(&self) -> bool {
        matches!(self.source, TelemetrySource::Real(_))
    }
}

pub fn real_telemetry_file_name(track_key: &str) -> String {
    format!("real_telemetry_{}.json", track_key.to_lowercase())
}

/// Load recorded telemetry for a track from `dir`.
///
/// Returns `Ok(None)` when there is no file for the track or it holds no samples.
pub fn load_real_telemetry(
    dir: &Path,
    track_key: &str,
) -> Result<Option<RealTelemetryFile>, TrackVizError> {
    let path = dir.join(real_telemetry_file_name(track_key));
    if !path.exists() {
        debug!("No recorded telemetry at {:?}", path);
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| TrackVizError::TelemetryIoError {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: RealTelemetryFile =
        serde_json::from_str(&content).map_err(|e| TrackVizError::TelemetryParseError {
            path: path.display().to_string(),
            source: e,
        })?;

    if file.telemetry.is_empty() {
        debug!("Recorded telemetry at {:?} is empty", path);
        return Ok(None);
    }
    Ok(Some(file))
}

/// Telemetry for a lap of `coords`, preferring a recording from `dir` and
/// synthesizing one when no usable recording exists.
pub fn lap_telemetry<R: Rng>(
    dir: &Path,
    track_key: &str,
    coords: &[TrackPoint],
    synthesizer: &mut TelemetrySynthesizer<R>,
) -> LapTelemetry {
    match load_real_telemetry(dir, track_key) {
        Ok(Some(file)) => match recorded_lap(file, coords) {
            Ok(lap) => return lap,
            Err(e) => warn!("Ignoring recorded telemetry for {}: {}", track_key, e),
        },
        Ok(None) => {}
        Err(e) => warn!("Recorded telemetry for {} not available: {}", track_key, e),
    }

    info!("Generating simulated telemetry for {}", track_key);
    LapTelemetry {
        source: TelemetrySource::Simulated,
        samples: synthesizer.synthesize(coords),
    }
}

fn recorded_lap(
    file: RealTelemetryFile,
    coords: &[TrackPoint],
) -> Result<LapTelemetry, TrackVizError> {
    if !super::validate_telemetry(&file.telemetry) {
        return Err(TrackVizError::InvalidTelemetry {
            reason: "samples contain non-finite values".to_string(),
        });
    }

    let samples: Vec<TelemetrySample> = file
        .telemetry
        .iter()
        .map(|raw| TelemetrySample::from(*raw))
        .collect();

    let metadata = file.metadata;
    info!(
        "Loaded recorded telemetry: {} points from {} ({}, {} {} {})",
        samples.len(),
        metadata.driver,
        metadata.team,
        metadata.gp,
        metadata.year.map(|y| y.to_string()).unwrap_or_default(),
        metadata.session
    );
    if let Some(stats) = TelemetryStats::from_samples(&samples) {
        info!(
            "Speed: {} km/h avg, {} km/h top",
            stats.average_speed, stats.top_speed
        );
    }

    Ok(LapTelemetry {
        source: TelemetrySource::Real(metadata),
        samples: normalize_to_track(coords, &samples),
    })
}

/// Write samples to `path`, one JSON object per line
pub fn write_telemetry_jsonl(
    path: &Path,
    samples: &[TelemetrySample],
) -> Result<(), TrackVizError> {
    serde_jsonlines::write_json_lines(path, samples).map_err(|e| {
        TrackVizError::TelemetryIoError {
            path: path.display().to_string(),
            source: e,
        }
    })?;
    debug!("Wrote {} telemetry samples to {:?}", samples.len(), path);
    Ok(())
}

/// Read samples written by [`write_telemetry_jsonl`]
pub fn read_telemetry_jsonl(path: &Path) -> Result<Vec<TelemetrySample>, TrackVizError> {
    let to_error = |e| TrackVizError::TelemetryIoError {
        path: path.display().to_string(),
        source: e,
    };
    serde_jsonlines::json_lines(path)
        .map_err(to_error)?
        .collect::<Result<Vec<TelemetrySample>, std::io::Error>>()
        .map_err(to_error)
}
