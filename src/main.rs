use std::{
    fs,
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_jsonlines::JsonLinesWriter;

use trackviz::{
    CornerDetector, CurvatureAnalyzer, TelemetryMapper, TelemetrySample, TelemetrySynthesizer,
    TrackLoader, TrackMapGenerator, TrackVizConfig, TrackVizError,
    telemetry::{
        TelemetrySource, TelemetryStats, lap_telemetry, read_telemetry_jsonl,
        write_telemetry_jsonl,
    },
    track_analysis::speed_zone_runs,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Config file to use instead of the one in the user's config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tracks in a data directory
    Tracks {
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Print the speed zones and corners of a track
    Analyze {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        track: String,
    },
    /// Produce lap telemetry for a track, recorded if available, simulated otherwise
    Synthesize {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        track: String,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for reproducible simulated telemetry
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Resample a JSON lines telemetry file to the point count of a track
    Normalize {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        track: String,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a track to an SVG map
    Map {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        track: String,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<TrackVizConfig, TrackVizError> {
    if let Some(path) = path {
        return TrackVizConfig::from_path(path);
    }
    match TrackVizConfig::from_local_file() {
        Ok(config) => Ok(config.unwrap_or_default()),
        Err(e) => {
            warn!("Using default config: {}", e);
            Ok(TrackVizConfig::default())
        }
    }
}

fn tracks(data: &Path) -> Result<(), TrackVizError> {
    let mut loader = TrackLoader::new(data);
    for entry in loader.track_list()? {
        println!("{:<24} {}", entry.key, entry.name);
    }
    Ok(())
}

fn analyze(config: &TrackVizConfig, data: &Path, key: &str) -> Result<(), TrackVizError> {
    let mut loader = TrackLoader::new(data);
    let track = loader.load_listed_track(key)?;

    let segments =
        CurvatureAnalyzer::with_config(config.curvature.clone()).analyze(&track.coordinates);
    let corners =
        CornerDetector::with_config(config.corners.clone()).detect(&track.coordinates);

    println!("{} ({} points)", track.name, track.point_count());
    if let Some(length) = &track.length {
        println!("Length: {}", length);
    }

    println!("\nSpeed zones:");
    for run in speed_zone_runs(&segments) {
        println!(
            "  {:>5}-{:<5} {:<13} {} points",
            run.start,
            run.end() - 1,
            run.zone.label(),
            run.len
        );
    }

    println!("\nCorners:");
    for corner in &corners {
        println!(
            "  T{:<3} apex {:>5} ({:.1}, {:.1})  {:>3} points  peak {:>5.1} deg  {:?}",
            corner.number,
            corner.apex_index,
            corner.position.x,
            corner.position.y,
            corner.points,
            corner.peak_angle,
            corner.direction
        );
    }
    if let Some(turns) = track.turns {
        if turns as usize != corners.len() {
            info!("Detected {} corners, the circuit has {} turns", corners.len(), turns);
        }
    }
    Ok(())
}

fn synthesize(
    config: &TrackVizConfig,
    data: &Path,
    key: &str,
    output: Option<&Path>,
    seed: Option<u64>,
) -> Result<(), TrackVizError> {
    let mut loader = TrackLoader::new(data);
    let track = loader.load_listed_track(key)?;

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut synthesizer = TelemetrySynthesizer::with_config(rng, config.synthesis.clone());
    let lap = lap_telemetry(data, key, &track.coordinates, &mut synthesizer);

    if let TelemetrySource::Real(metadata) = &lap.source {
        info!("Using recorded lap by {} ({})", metadata.driver, metadata.team);
    }
    if let Some(stats) = TelemetryStats::from_samples(&lap.samples) {
        info!(
            "{} samples, {} km/h avg, {} km/h top",
            stats.samples, stats.average_speed, stats.top_speed
        );
    }

    write_samples(output, &lap.samples)
}

fn normalize(
    data: &Path,
    key: &str,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), TrackVizError> {
    let mut loader = TrackLoader::new(data);
    loader.load_listed_track(key)?;

    let samples = read_telemetry_jsonl(input)?;
    let normalized = TelemetryMapper::new().normalize_to_track_key(&loader, key, &samples);
    info!(
        "Resampled {} telemetry samples to {}",
        samples.len(),
        normalized.len()
    );

    write_samples(output, &normalized)
}

fn map(
    config: &TrackVizConfig,
    data: &Path,
    key: &str,
    output: &Path,
) -> Result<(), TrackVizError> {
    let mut loader = TrackLoader::new(data);
    let track = loader.load_listed_track(key)?;

    let segments =
        CurvatureAnalyzer::with_config(config.curvature.clone()).analyze(&track.coordinates);
    let corners =
        CornerDetector::with_config(config.corners.clone()).detect(&track.coordinates);
    let svg = TrackMapGenerator::with_config(config.track_map.clone()).render(
        &track.coordinates,
        &segments,
        &corners,
    )?;

    fs::write(output, svg).map_err(|e| TrackVizError::OutputIoError {
        path: output.display().to_string(),
        source: e,
    })?;
    info!("Wrote track map for {} to {:?}", track.name, output);
    Ok(())
}

/// Write samples as JSON lines to a file, or to stdout without one
fn write_samples(
    output: Option<&Path>,
    samples: &[TelemetrySample],
) -> Result<(), TrackVizError> {
    if let Some(path) = output {
        return write_telemetry_jsonl(path, samples);
    }

    let to_error = |e| TrackVizError::OutputIoError {
        path: "<stdout>".to_string(),
        source: e,
    };
    let mut writer = JsonLinesWriter::new(io::stdout().lock());
    writer.write_all(samples).map_err(to_error)?;
    writer.flush().map_err(to_error)
}

fn run(cli: &Args) -> Result<(), TrackVizError> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Tracks { data } => tracks(data),
        Commands::Analyze { data, track } => analyze(&config, data, track),
        Commands::Synthesize {
            data,
            track,
            output,
            seed,
        } => synthesize(&config, data, track, output.as_deref(), *seed),
        Commands::Normalize {
            data,
            track,
            input,
            output,
        } => normalize(data, track, input, output.as_deref()),
        Commands::Map {
            data,
            track,
            output,
        } => map(&config, data, track, output),
    }
}

fn main() -> ExitCode {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", snafu::Report::from_error(e));
            ExitCode::FAILURE
        }
    }
}
