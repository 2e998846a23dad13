// Error types for trackviz

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum TrackVizError {
    // Track data loader errors
    #[snafu(display("Track {key} not loaded. Call load_track() first"))]
    TrackNotLoaded { key: String },
    #[snafu(display("Track not found: {key}"))]
    TrackNotFound { key: String },
    #[snafu(display("Track index not found in {path}"))]
    TrackIndexMissing { path: String },
    #[snafu(display("Error reading track data file {path}"))]
    TrackIoError { path: String, source: io::Error },
    #[snafu(display("Error parsing track data file {path}"))]
    TrackParseError {
        path: String,
        source: serde_json::Error,
    },

    // Telemetry loading and export errors
    #[snafu(display("Error accessing telemetry file {path}"))]
    TelemetryIoError { path: String, source: io::Error },
    #[snafu(display("Error parsing telemetry file {path}"))]
    TelemetryParseError {
        path: String,
        source: serde_json::Error,
    },
    #[snafu(display("Invalid telemetry data: {reason}"))]
    InvalidTelemetry { reason: String },

    // Config management errors
    #[snafu(display("Could not find application config directory"))]
    NoConfigDir,
    #[snafu(display("Error accessing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Track map rendering errors
    #[snafu(display("Track map generation failed: {reason}"))]
    TrackMapError { reason: String },

    // CLI output errors
    #[snafu(display("Error writing output to {path}"))]
    OutputIoError { path: String, source: io::Error },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
}
