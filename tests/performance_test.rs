use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;
use trackviz::telemetry::normalize_to_track;
use trackviz::{CornerDetector, CurvatureAnalyzer, TelemetrySynthesizer, TrackPoint};

/// Closed loop with a slowly varying radius, sized like a detailed circuit trace
fn create_track(points: usize) -> Vec<TrackPoint> {
    (0..points)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / points as f64;
            let radius = 2000.0 + 400.0 * (3.0 * theta).sin();
            TrackPoint::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// A full analysis of a large track should stay interactive
#[test]
fn test_full_pipeline_on_large_track() {
    let coords = create_track(20_000);

    let start = Instant::now();
    let segments = CurvatureAnalyzer::new().analyze(&coords);
    let corners = CornerDetector::new().detect(&coords);
    let mut synthesizer = TelemetrySynthesizer::with_rng(StdRng::seed_from_u64(3));
    let telemetry = synthesizer.synthesize(&coords);
    let elapsed = start.elapsed();

    println!(
        "Analyzed {} points ({} corners) and synthesized {} samples in {:?}",
        coords.len(),
        corners.len(),
        telemetry.len(),
        elapsed
    );

    assert_eq!(segments.len(), coords.len());
    assert_eq!(telemetry.len(), coords.len());
    assert!(
        elapsed.as_secs_f64() < 5.0,
        "Pipeline too slow: {:?} for {} points",
        elapsed,
        coords.len()
    );
}

/// Resampling a long recording onto a track is linear in the output size
#[test]
fn test_normalize_long_recording() {
    let coords = create_track(5_000);
    let mut synthesizer = TelemetrySynthesizer::with_rng(StdRng::seed_from_u64(9));
    let recording = synthesizer.synthesize(&create_track(50_000));

    let start = Instant::now();
    let normalized = normalize_to_track(&coords, &recording);
    let elapsed = start.elapsed();

    println!(
        "Resampled {} samples to {} in {:?}",
        recording.len(),
        normalized.len(),
        elapsed
    );

    assert_eq!(normalized.len(), coords.len());
    assert!(elapsed.as_millis() < 1000, "Resampling too slow: {:?}", elapsed);
}
