pub mod loader;
pub mod mapper;
pub mod playback;
pub mod synthesizer;

use serde::{Deserialize, Serialize};

pub use loader::{
    LapTelemetry, RealTelemetryFile, TelemetryMetadata, TelemetrySource, lap_telemetry,
    load_real_telemetry, read_telemetry_jsonl, write_telemetry_jsonl,
};
pub use mapper::{
    TelemetryMapper, calculate_distances, interpolate, map_to_track, normalize_to_track,
};
pub use playback::{LapPlayback, PLAYBACK_STEP, PlaybackFrame};
pub use synthesizer::{SynthesisConfig, TelemetrySynthesizer, gear_for_speed};

/// Vehicle state at one point of the lap
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TelemetrySample {
    /// Speed in km/h
    pub speed: u32,
    /// Throttle use, 0-100
    pub throttle: u32,
    /// Brake use, 0-100
    pub brake: u32,
    pub gear: u8,
}

/// Brake channel as found in external telemetry, either a pressure
/// percentage or an on/off flag
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PedalValue {
    Flag(bool),
    Value(f64),
}

impl PedalValue {
    pub fn as_percentage(&self) -> f64 {
        match self {
            PedalValue::Flag(true) => 100.0,
            PedalValue::Flag(false) => 0.0,
            PedalValue::Value(value) => *value,
        }
    }
}

/// Telemetry sample as loaded from an external file
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawTelemetrySample {
    pub speed: f64,
    pub throttle: f64,
    pub brake: PedalValue,
    pub gear: f64,
}

impl RawTelemetrySample {
    pub fn is_finite(&self) -> bool {
        self.speed.is_finite()
            && self.throttle.is_finite()
            && self.brake.as_percentage().is_finite()
            && self.gear.is_finite()
    }
}

impl From<RawTelemetrySample> for TelemetrySample {
    fn from(raw: RawTelemetrySample) -> Self {
        // float to int casts saturate, so negative noise lands on 0
        Self {
            speed: raw.speed.round() as u32,
            throttle: raw.throttle.round().min(100.0) as u32,
            brake: raw.brake.as_percentage().round().min(100.0) as u32,
            gear: raw.gear.round() as u8,
        }
    }
}

/// Summary of a lap's speed trace
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TelemetryStats {
    pub average_speed: u32,
    pub top_speed: u32,
    pub samples: usize,
}

impl TelemetryStats {
    pub fn from_samples(samples: &[TelemetrySample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let total: u64 = samples.iter().map(|s| s.speed as u64).sum();
        let top_speed = samples.iter().map(|s| s.speed).max().unwrap_or(0);
        Some(Self {
            average_speed: (total as f64 / samples.len() as f64).round() as u32,
            top_speed,
            samples: samples.len(),
        })
    }
}

/// Check that a raw telemetry trace can be used: non-empty and every channel finite
pub fn validate_telemetry(samples: &[RawTelemetrySample]) -> bool {
    !samples.is_empty() && samples.iter().all(RawTelemetrySample::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(speed: f64, throttle: f64, brake: PedalValue, gear: f64) -> RawTelemetrySample {
        RawTelemetrySample {
            speed,
            throttle,
            brake,
            gear,
        }
    }

    #[test]
    fn test_raw_sample_deserializes_bool_and_numeric_brake() {
        let samples: Vec<RawTelemetrySample> = serde_json::from_str(
            r#"[
                {"speed": 287.4, "throttle": 99.0, "brake": false, "gear": 7},
                {"speed": 112.0, "throttle": 0.0, "brake": true, "gear": 3},
                {"speed": 150.2, "throttle": 12.5, "brake": 64.5, "gear": 4}
            ]"#,
        )
        .unwrap();

        assert_eq!(samples[0].brake, PedalValue::Flag(false));
        assert_eq!(samples[1].brake, PedalValue::Flag(true));
        assert_eq!(samples[2].brake, PedalValue::Value(64.5));
    }

    #[test]
    fn test_raw_sample_conversion_rounds() {
        let sample: TelemetrySample = raw(287.4, 99.6, PedalValue::Flag(true), 7.0).into();
        assert_eq!(
            sample,
            TelemetrySample {
                speed: 287,
                throttle: 100,
                brake: 100,
                gear: 7
            }
        );

        let sample: TelemetrySample = raw(-3.0, 104.0, PedalValue::Value(12.5), 3.0).into();
        assert_eq!(sample.speed, 0);
        assert_eq!(sample.throttle, 100);
        assert_eq!(sample.brake, 13);
    }

    #[test]
    fn test_validate_telemetry() {
        assert!(!validate_telemetry(&[]));
        assert!(validate_telemetry(&[raw(
            200.0,
            80.0,
            PedalValue::Value(0.0),
            5.0
        )]));
        assert!(!validate_telemetry(&[
            raw(200.0, 80.0, PedalValue::Value(0.0), 5.0),
            raw(f64::NAN, 80.0, PedalValue::Value(0.0), 5.0),
        ]));
    }

    #[test]
    fn test_stats() {
        let samples = vec![
            TelemetrySample {
                speed: 100,
                ..Default::default()
            },
            TelemetrySample {
                speed: 301,
                ..Default::default()
            },
        ];
        let stats = TelemetryStats::from_samples(&samples).unwrap();
        assert_eq!(stats.average_speed, 201);
        assert_eq!(stats.top_speed, 301);
        assert_eq!(stats.samples, 2);
        assert!(TelemetryStats::from_samples(&[]).is_none());
    }
}
