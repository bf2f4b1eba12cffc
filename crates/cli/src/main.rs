use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use clap::Parser;

use moodsense_core::classification::domain::mood::Mood;
use moodsense_core::detection::domain::landmark_extractor::LandmarkExtractor;
use moodsense_core::detection::infrastructure::image_sequence_source::ImageSequenceSource;
use moodsense_core::detection::infrastructure::model_cache::ModelCache;
use moodsense_core::detection::infrastructure::onnx_face_mesh_extractor::OnnxFaceMeshExtractor;
use moodsense_core::session::detection_session::{DetectionSession, SessionConfig, SessionEvent};
use moodsense_core::session::track_fetcher::TrackFetcher;

/// Mood detection over a directory of webcam frames.
#[derive(Parser)]
#[command(name = "moodsense")]
struct Cli {
    /// Directory of still frames, served in name order.
    frames_dir: PathBuf,

    /// Path to a face-mesh ONNX model (skips model resolution).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Skip the face-mesh model entirely and classify randomly.
    #[arg(long)]
    no_model: bool,

    /// Milliseconds between classification ticks.
    #[arg(long, default_value = "2000")]
    interval_ms: u64,

    /// Milliseconds to wait before the first classification.
    #[arg(long, default_value = "2000")]
    stabilization_ms: u64,

    /// Stop after this many ticks (default: run until frames run out).
    #[arg(long)]
    ticks: Option<u64>,

    /// Seed for the random fallback classifier.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let extractor = build_extractor(&cli)?;
    let source = Box::new(ImageSequenceSource::new(&cli.frames_dir));
    let fetcher: Box<dyn TrackFetcher> = Box::new(LoggingTrackFetcher);

    let config = SessionConfig {
        stabilization_delay: Duration::from_millis(cli.stabilization_ms),
        tick_interval: Duration::from_millis(cli.interval_ms),
        max_ticks: cli.ticks,
        fallback_seed: cli.seed,
    };

    let mut session = DetectionSession::start(source, extractor, fetcher, config)?;

    for event in session.events().iter() {
        match event {
            SessionEvent::Started { width, height } => {
                log::info!("Detection started ({width}x{height})");
            }
            SessionEvent::MoodChanged { reading } => {
                println!(
                    "mood: {} (confidence {:.2})",
                    reading.mood, reading.confidence
                );
            }
            SessionEvent::FetchStarted { mood } => {
                log::info!("Fetching tracks for mood '{mood}'");
            }
            SessionEvent::FetchCompleted { mood, track_count } => {
                println!("fetched {track_count} tracks for mood '{mood}'");
            }
            SessionEvent::FetchFailed { mood, error } => {
                eprintln!("track fetch failed for mood '{mood}': {error}");
            }
            SessionEvent::Warning(msg) => {
                eprintln!("Warning: {msg}");
            }
            SessionEvent::Stopped { .. } => break,
        }
    }

    match session.stop() {
        Some(mood) => println!("final mood: {mood}"),
        None => println!("no mood detected"),
    }

    Ok(())
}

/// A stand-in track source that logs instead of calling a music backend.
struct LoggingTrackFetcher;

impl TrackFetcher for LoggingTrackFetcher {
    fn fetch_tracks(&mut self, mood: Mood) -> Result<usize, Box<dyn std::error::Error>> {
        log::info!("Would fetch a '{mood}' playlist");
        Ok(0)
    }
}

fn build_extractor(
    cli: &Cli,
) -> Result<Option<Box<dyn LandmarkExtractor>>, Box<dyn std::error::Error>> {
    if cli.no_model {
        return Ok(None);
    }

    if let Some(path) = &cli.model {
        return Ok(Some(Box::new(OnnxFaceMeshExtractor::new(path)?)));
    }

    let cache = ModelCache::new();
    let cancelled = AtomicBool::new(false);
    match cache.wait_for_face_mesh(&download_progress, &cancelled) {
        Ok(path) => {
            eprintln!();
            Ok(Some(Box::new(OnnxFaceMeshExtractor::new(&path)?)))
        }
        Err(e) => {
            // Model resolution failure degrades to random classification,
            // it never aborts the session
            log::warn!("face-mesh model unavailable: {e}");
            Ok(None)
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames_dir.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames_dir.display()).into());
    }
    if cli.interval_ms == 0 {
        return Err("Tick interval must be at least 1 ms".into());
    }
    if cli.no_model && cli.model.is_some() {
        return Err("--model and --no-model are mutually exclusive".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face-mesh model... {pct}%");
    } else {
        eprint!("\rDownloading face-mesh model... {downloaded} bytes");
    }
}
