use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use ring_visualiser_core::{
    config::{BUFFER_PERIOD_MS, BUFFER_SIZE, SAMPLE_RATE, SCREEN_SIZE},
    AppConfig, Canvas, ManualClock, SharedVisualState, SignalGenerator,
};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "capture")]
mod capture;

fn main() -> ring_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            frames,
            seed,
            snapshot,
        } => {
            let mut app_config = load_config(config.as_deref())?;
            if let Some(frames) = frames {
                app_config.simulation.frames = frames;
            }
            if let Some(seed) = seed {
                app_config.simulation.seed = seed;
            }
            run_simulation(&app_config, snapshot.as_deref())
        }
        #[cfg(feature = "capture")]
        Commands::Live { seconds, snapshot } => capture::run_live(seconds, snapshot.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> ring_visualiser_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::from_json_file(path)
        }
        None => Ok(AppConfig::live_defaults()),
    }
}

/// Drives the shared state from a synthetic kick train, interleaving audio
/// buffers and render frames at their own cadences on a hand-stepped clock.
fn run_simulation(config: &AppConfig, snapshot: Option<&Path>) -> ring_visualiser_core::Result<()> {
    let sim = &config.simulation;
    tracing::info!(
        frames = sim.frames,
        seed = sim.seed,
        bpm = sim.bpm,
        "starting simulation"
    );

    let shared = SharedVisualState::new();
    let clock = ManualClock::new();
    let mut feed = shared.producer(clock.clone(), StdRng::seed_from_u64(sim.seed));
    let renderer = shared.renderer(clock.clone());
    let mut signal = SignalGenerator::new(SAMPLE_RATE, BUFFER_SIZE);
    let mut canvas = Canvas::new(SCREEN_SIZE, SCREEN_SIZE);

    let mut next_buffer_at = 0.0_f64;
    let mut peak_particles = 0;

    for frame in 0..sim.frames {
        let frame_at = frame as u64 * sim.frame_interval_ms;

        while next_buffer_at <= frame_at as f64 {
            clock.set(next_buffer_at as u64);
            let block = signal.kick_train(sim.bpm, sim.pulse_level, sim.floor_level);
            let analysis = feed.on_buffer(&block)?;
            if analysis.onset {
                tracing::debug!(
                    at_ms = next_buffer_at as u64,
                    energy = analysis.energy,
                    baseline = analysis.baseline,
                    "onset"
                );
            }
            next_buffer_at += BUFFER_PERIOD_MS;
        }

        clock.set(frame_at);
        let stats = renderer.draw(&mut canvas)?;
        peak_particles = peak_particles.max(stats.active_particles);

        if frame % 60 == 0 {
            tracing::info!(
                frame,
                radius = stats.radius,
                particles = stats.active_particles,
                "frame"
            );
        }
    }

    let state = shared.snapshot()?;
    tracing::info!(
        buffers = feed.buffers(),
        onsets = feed.onsets(),
        peak_particles,
        active_particles = state.particles.active_count(),
        hue = state.hue,
        "simulation finished"
    );

    if let Some(path) = snapshot {
        canvas.save_png(path)?;
        tracing::info!(?path, "wrote snapshot");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-reactive ring and particle visualiser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run headless against a synthetic kick train.
    Simulate {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to render.
        #[arg(short, long)]
        frames: Option<u32>,
        /// Seed for particle spawns.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Write the final frame to this PNG file.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Capture from the default input device.
    #[cfg(feature = "capture")]
    Live {
        /// Stop after this many seconds instead of running until killed.
        #[arg(long)]
        seconds: Option<u64>,
        /// Write the last frame to this PNG file on exit.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}
