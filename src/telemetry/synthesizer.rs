// Synthetic lap telemetry derived from track curvature

use log::{debug, warn};
use rand::Rng;
use rand::rngs::ThreadRng;
use serde::{Deserialize, Serialize};
use simple_moving_average::{SMA, SumTreeSMA};

use super::TelemetrySample;
use crate::geometry::{TrackPoint, circular_index, windowed_heading_change};

/// Top speed on a straight (km/h)
pub const MAX_SPEED: f64 = 330.0;
/// Slowest speed through the tightest corner (km/h)
pub const MIN_SPEED: f64 = 80.0;
/// Speed shed between a straight and the tightest corner (km/h)
const CORNER_SPEED_LOSS: f64 = 250.0;
/// Speed drop between consecutive points that counts as braking (km/h)
const BRAKING_SPEED_DROP: f64 = 10.0;
/// Smoothing window on each side of a sample; 7 samples in total
const SMOOTHING_RADIUS: usize = 3;
const SMOOTHING_WINDOW: usize = SMOOTHING_RADIUS * 2 + 1;

/// Upper speed bound (exclusive) of each gear from 2nd to 7th; faster is 8th
const GEAR_SPEED_LIMITS: [(u32, u8); 6] = [
    (100, 2),
    (150, 3),
    (200, 4),
    (250, 5),
    (290, 6),
    (320, 7),
];
const TOP_GEAR: u8 = 8;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Points to look behind and ahead when measuring curvature
    pub curvature_window: usize,
    /// Uniform speed noise is drawn from `[-noise_amplitude, noise_amplitude)`; 0 disables it
    pub noise_amplitude: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            curvature_window: 5,
            noise_amplitude: 5.0,
        }
    }
}

/// Gear engaged at a given speed
pub fn gear_for_speed(speed: u32) -> u8 {
    GEAR_SPEED_LIMITS
        .iter()
        .find(|(limit, _)| speed < *limit)
        .map(|(_, gear)| *gear)
        .unwrap_or(TOP_GEAR)
}

/// Generates plausible speed, throttle, brake and gear traces for a track
/// when no real telemetry is available.
pub struct TelemetrySynthesizer<R: Rng> {
    rng: R,
    config: SynthesisConfig,
}

impl TelemetrySynthesizer<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for TelemetrySynthesizer<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TelemetrySynthesizer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            config: SynthesisConfig::default(),
        }
    }

    pub fn with_config(rng: R, config: SynthesisConfig) -> Self {
        Self { rng, config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize one telemetry sample per track point, in track order
    pub fn synthesize(&mut self, coords: &[TrackPoint]) -> Vec<TelemetrySample> {
        if coords.is_empty() {
            warn!("No track coordinates provided for telemetry generation");
            return Vec::new();
        }

        let curvatures = curvature_signal(coords, self.config.curvature_window);
        let max_curvature = curvatures.iter().fold(0.0f64, |max, c| max.max(c.abs()));
        // a degenerate track has no curvature to normalise against
        let max_curvature = if max_curvature == 0.0 {
            1.0
        } else {
            max_curvature
        };

        let normalized: Vec<f64> = curvatures
            .iter()
            .map(|c| c.abs() / max_curvature)
            .collect();
        let speeds: Vec<u32> = normalized
            .iter()
            .map(|nc| self.speed_for_curvature(*nc))
            .collect();

        let raw = apply_pedals(&speeds, &normalized);
        debug!(
            "Synthesized {} raw samples, max curvature {:.4} rad",
            raw.len(),
            max_curvature
        );
        smooth_telemetry(&raw)
    }

    fn speed_for_curvature(&mut self, normalized_curvature: f64) -> u32 {
        let base_speed = MAX_SPEED - normalized_curvature * CORNER_SPEED_LOSS;
        let noise = if self.config.noise_amplitude > 0.0 {
            self.rng
                .gen_range(-self.config.noise_amplitude..self.config.noise_amplitude)
        } else {
            0.0
        };
        (base_speed + noise).round().clamp(MIN_SPEED, MAX_SPEED) as u32
    }
}

/// Signed heading change at every point over a circular window, in radians
pub fn curvature_signal(coords: &[TrackPoint], window: usize) -> Vec<f64> {
    (0..coords.len())
        .map(|i| windowed_heading_change(coords, i, window))
        .collect()
}

/// Derive throttle, brake and gear from the speed trace.
///
/// Braking compares each speed with the one before it, so this is a left to
/// right fold carrying the previous speed.
fn apply_pedals(speeds: &[u32], normalized_curvature: &[f64]) -> Vec<TelemetrySample> {
    let mut prev_speed: Option<u32> = None;
    speeds
        .iter()
        .zip(normalized_curvature)
        .map(|(&speed, &nc)| {
            let throttle = (speed as f64 / MAX_SPEED * 100.0 + 20.0).min(100.0).round() as u32;

            let brake = match prev_speed {
                Some(prev) if prev as f64 - speed as f64 > BRAKING_SPEED_DROP => {
                    let speed_drop = (prev - speed) as f64;
                    (speed_drop / 200.0 * 100.0 + nc * 50.0).round().min(100.0) as u32
                }
                _ => 0,
            };
            prev_speed = Some(speed);

            TelemetrySample {
                speed,
                throttle: if brake > 0 {
                    throttle.saturating_sub(brake)
                } else {
                    throttle
                },
                brake,
                gear: gear_for_speed(speed),
            }
        })
        .collect()
}

/// Running averages of the continuous channels of a telemetry trace
struct ChannelAverages {
    speed: SumTreeSMA<f64, f64, SMOOTHING_WINDOW>,
    throttle: SumTreeSMA<f64, f64, SMOOTHING_WINDOW>,
    brake: SumTreeSMA<f64, f64, SMOOTHING_WINDOW>,
}

impl ChannelAverages {
    fn new() -> Self {
        Self {
            speed: SumTreeSMA::new(),
            throttle: SumTreeSMA::new(),
            brake: SumTreeSMA::new(),
        }
    }

    fn add_sample(&mut self, sample: &TelemetrySample) {
        self.speed.add_sample(sample.speed as f64);
        self.throttle.add_sample(sample.throttle as f64);
        self.brake.add_sample(sample.brake as f64);
    }

    fn average(&self, gear: u8) -> TelemetrySample {
        TelemetrySample {
            speed: self.speed.get_average().round() as u32,
            throttle: self.throttle.get_average().round() as u32,
            brake: self.brake.get_average().round() as u32,
            gear,
        }
    }
}

/// Circular moving average of speed, throttle and brake over 7 samples.
///
/// Gear is a discrete value and keeps the centre sample's gear.
pub fn smooth_telemetry(samples: &[TelemetrySample]) -> Vec<TelemetrySample> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let mut averages = ChannelAverages::new();
    // prime the window with the samples that wrap around behind index 0
    for offset in 0..SMOOTHING_WINDOW - 1 {
        let index = circular_index(offset as isize - SMOOTHING_RADIUS as isize, n);
        averages.add_sample(&samples[index]);
    }

    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            averages.add_sample(&samples[circular_index((i + SMOOTHING_RADIUS) as isize, n)]);
            averages.average(sample.gear)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn quiet_synthesizer() -> TelemetrySynthesizer<StdRng> {
        TelemetrySynthesizer::with_config(
            StdRng::seed_from_u64(7),
            SynthesisConfig {
                noise_amplitude: 0.0,
                ..Default::default()
            },
        )
    }

    fn sample(speed: u32, throttle: u32, brake: u32, gear: u8) -> TelemetrySample {
        TelemetrySample {
            speed,
            throttle,
            brake,
            gear,
        }
    }

    /// Long straight, hairpin, straight back: a stadium shaped track
    fn stadium_track() -> Vec<TrackPoint> {
        let mut coords = Vec::new();
        for i in 0..50 {
            coords.push(TrackPoint::new(i as f64 * 20.0, 0.0));
        }
        for i in 0..20 {
            let theta = -std::f64::consts::FRAC_PI_2 + std::f64::consts::PI * i as f64 / 20.0;
            coords.push(TrackPoint::new(1000.0 + 100.0 * theta.cos(), 100.0 + 100.0 * theta.sin()));
        }
        for i in 0..50 {
            coords.push(TrackPoint::new(1000.0 - i as f64 * 20.0, 200.0));
        }
        for i in 0..20 {
            let theta = std::f64::consts::FRAC_PI_2 + std::f64::consts::PI * i as f64 / 20.0;
            coords.push(TrackPoint::new(100.0 * theta.cos(), 100.0 + 100.0 * theta.sin()));
        }
        coords
    }

    #[test]
    fn test_gear_thresholds() {
        assert_eq!(gear_for_speed(80), 2);
        assert_eq!(gear_for_speed(99), 2);
        assert_eq!(gear_for_speed(100), 3);
        assert_eq!(gear_for_speed(149), 3);
        assert_eq!(gear_for_speed(150), 4);
        assert_eq!(gear_for_speed(199), 4);
        assert_eq!(gear_for_speed(200), 5);
        assert_eq!(gear_for_speed(249), 5);
        assert_eq!(gear_for_speed(250), 6);
        assert_eq!(gear_for_speed(289), 6);
        assert_eq!(gear_for_speed(290), 7);
        assert_eq!(gear_for_speed(319), 7);
        assert_eq!(gear_for_speed(320), 8);
        assert_eq!(gear_for_speed(330), 8);
    }

    #[test]
    fn test_empty_track() {
        assert!(quiet_synthesizer().synthesize(&[]).is_empty());
        assert!(smooth_telemetry(&[]).is_empty());
    }

    #[test]
    fn test_degenerate_track_runs_flat_out() {
        // coincident points have no heading at all; the zero curvature guard
        // keeps the normalisation finite
        let coords = vec![TrackPoint::new(3.0, 3.0); 20];
        let telemetry = quiet_synthesizer().synthesize(&coords);

        assert_eq!(telemetry.len(), 20);
        for sample in &telemetry {
            assert_eq!(sample.speed, 330);
            assert_eq!(sample.throttle, 100);
            assert_eq!(sample.brake, 0);
            assert_eq!(sample.gear, 8);
        }
    }

    #[test]
    fn test_pedals_brake_on_speed_drop() {
        let samples = apply_pedals(&[330, 300, 295, 310], &[0.0, 0.8, 0.1, 0.0]);

        assert_eq!(samples[0].brake, 0);
        assert_eq!(samples[0].throttle, 100);
        // drop of 30: 30/200*100 + 0.8*50 = 55
        assert_eq!(samples[1].brake, 55);
        // throttle 300/330*100+20 = 110.9 -> 100, minus the brake
        assert_eq!(samples[1].throttle, 45);
        assert_eq!(samples[1].gear, 7);
        // drop of 5 is not braking
        assert_eq!(samples[2].brake, 0);
        assert_eq!(samples[3].brake, 0);
    }

    #[test]
    fn test_pedals_brake_is_capped() {
        let samples = apply_pedals(&[330, 80], &[0.0, 1.0]);
        // 250/200*100 + 50 = 175, capped
        assert_eq!(samples[1].brake, 100);
        assert_eq!(samples[1].throttle, 0);
        assert_eq!(samples[1].gear, 2);
    }

    #[test]
    fn test_first_sample_never_brakes() {
        // the lap does not wrap back to compare against the last sample
        let samples = apply_pedals(&[80, 330], &[1.0, 0.0]);
        assert_eq!(samples[0].brake, 0);
    }

    #[test]
    fn test_smoothing_wraps_around() {
        let mut samples = vec![sample(100, 50, 0, 3); 10];
        samples[8] = sample(170, 50, 70, 4);

        let smoothed = smooth_telemetry(&samples);
        // index 0 averages indices 7, 8, 9, 0, 1, 2, 3
        assert_eq!(smoothed[0].speed, 110);
        assert_eq!(smoothed[0].brake, 10);
        assert_eq!(smoothed[0].gear, 3);
        // index 4 only sees 1..=7
        assert_eq!(smoothed[4].speed, 100);
        assert_eq!(smoothed[8].gear, 4);
    }

    #[test]
    fn test_smoothing_short_lap_repeats_samples() {
        let samples = vec![sample(100, 0, 0, 3), sample(300, 100, 0, 7)];
        let smoothed = smooth_telemetry(&samples);
        // window of 7 over 2 samples: index 0 sees 1,0,1,0,1,0,1
        assert_eq!(smoothed[0].speed, 214);
        assert_eq!(smoothed[1].speed, 186);
        assert_eq!(smoothed[0].gear, 3);
        assert_eq!(smoothed[1].gear, 7);
    }

    #[test]
    fn test_stadium_slows_in_hairpins() {
        let coords = stadium_track();
        let telemetry = quiet_synthesizer().synthesize(&coords);
        assert_eq!(telemetry.len(), coords.len());

        // middle of the first straight versus middle of the first hairpin
        assert_eq!(telemetry[25].speed, 330);
        assert!(telemetry[60].speed < 200);
        // braking happens on the approach to the hairpin
        assert!(telemetry[40..60].iter().any(|s| s.brake > 0));
    }

    #[test]
    fn test_curvature_signal_sign_and_size() {
        // 72 points, 5 degrees apart: a 5 point window turns 25 degrees
        let left: Vec<TrackPoint> = (0..72)
            .map(|i| {
                let theta = (i as f64 * 5.0).to_radians();
                TrackPoint::new(100.0 * theta.cos(), 100.0 * theta.sin())
            })
            .collect();
        let expected = 25f64.to_radians();
        for value in curvature_signal(&left, 5) {
            assert!((value - expected).abs() < 1e-9);
        }

        let right: Vec<TrackPoint> = left.iter().rev().copied().collect();
        for value in curvature_signal(&right, 5) {
            assert!((value + expected).abs() < 1e-9);
        }

        let straight: Vec<TrackPoint> =
            (0..40).map(|i| TrackPoint::new(i as f64 * 10.0, 0.0)).collect();
        let signal = curvature_signal(&straight, 5);
        assert_eq!(signal.len(), 40);
        assert!(signal[20].abs() < 1e-12);
    }

    #[test]
    fn test_seeded_output_is_reproducible() {
        let coords = stadium_track();
        let first = TelemetrySynthesizer::with_rng(StdRng::seed_from_u64(42)).synthesize(&coords);
        let second = TelemetrySynthesizer::with_rng(StdRng::seed_from_u64(42)).synthesize(&coords);
        assert_eq!(first, second);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_telemetry_within_ranges(
            coords in prop::collection::vec((-2000.0f64..2000.0, -2000.0f64..2000.0), 1..150),
            seed in any::<u64>(),
        ) {
            let coords: Vec<TrackPoint> =
                coords.into_iter().map(|(x, y)| TrackPoint::new(x, y)).collect();
            let telemetry =
                TelemetrySynthesizer::with_rng(StdRng::seed_from_u64(seed)).synthesize(&coords);

            prop_assert_eq!(telemetry.len(), coords.len());
            for sample in &telemetry {
                prop_assert!((80..=330).contains(&sample.speed));
                prop_assert!(sample.throttle <= 100);
                prop_assert!(sample.brake <= 100);
                prop_assert!((2..=8).contains(&sample.gear));
            }
        }
    }
}
