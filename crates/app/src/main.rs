use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use trigram_viz_core::{
    intensity, suggest_brightness, AppConfig, ByteBlob, DataSource, ManipulatorKind, Mode,
    RecordingBackend, Shape, VisualizationSurface,
};

fn main() -> trigram_viz_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Suggest { input } => run_suggest(&input),
        Commands::Simulate {
            input,
            config,
            frames,
            shape,
            mode,
            output,
        } => run_simulate(SimulateArgs {
            input,
            config,
            frames,
            shape,
            mode,
            output,
        }),
    }
}

fn run_suggest(input: &Path) -> trigram_viz_core::Result<()> {
    let blob = ByteBlob::from_path(input)?;
    let brightness = suggest_brightness(blob.data());
    tracing::info!(?input, size = blob.data_size(), brightness, "suggested brightness");

    println!(
        "{}",
        serde_json::to_string_pretty(&Suggestion {
            size: blob.data_size(),
            brightness,
            intensity: intensity(brightness, blob.data_size()),
        })?
    );
    Ok(())
}

struct SimulateArgs {
    input: PathBuf,
    config: Option<PathBuf>,
    frames: u32,
    shape: Option<Shape>,
    mode: Option<Mode>,
    output: Option<PathBuf>,
}

fn run_simulate(args: SimulateArgs) -> trigram_viz_core::Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let blob = ByteBlob::from_path(&args.input)?;
    tracing::info!(input = ?args.input, frames = args.frames, "running headless simulation");

    let start = Instant::now();
    let period = config.surface.tick_period();
    let mut surface = VisualizationSurface::new(&config, blob, RecordingBackend::new(), start);
    surface.initialize(start)?;
    if let Some(shape) = args.shape {
        surface.set_shape(shape, true);
    }
    if let Some(mode) = args.mode {
        surface.set_mode(mode, true);
    }

    let mut now = start;
    for _ in 0..args.frames {
        now += period;
        surface.poll(now)?;
    }

    for note in surface.take_notifications() {
        tracing::debug!(?note, "surface notification");
    }

    let report = SimulationReport::from_surface(&surface);
    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Serialize)]
struct Suggestion {
    size: usize,
    brightness: u32,
    intensity: f32,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    frames_drawn: u64,
    points_per_frame: usize,
    shape: Shape,
    mode: Mode,
    cyl_blend: f32,
    sph_blend: f32,
    pos_blend: f32,
    angle: f32,
    brightness: u32,
    heuristic: bool,
    intensity: f32,
    manipulator: ManipulatorKind,
}

impl SimulationReport {
    fn from_surface(surface: &VisualizationSurface<ByteBlob, RecordingBackend>) -> Self {
        let morph = surface.morph();
        let brightness = surface.brightness();
        Self {
            frames_drawn: surface.backend().frames_drawn(),
            points_per_frame: surface.point_count(),
            shape: morph.shape(),
            mode: morph.mode(),
            cyl_blend: morph.cyl_blend(),
            sph_blend: morph.sph_blend(),
            pos_blend: morph.pos_blend(),
            angle: morph.angle(),
            brightness: brightness.value(),
            heuristic: brightness.heuristic_enabled(),
            intensity: brightness.intensity(),
            manipulator: surface.active_manipulator(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Trigram point-cloud visualiser for binary data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the brightness the histogram heuristic picks for a file.
    Suggest {
        /// File to analyse.
        input: PathBuf,
    },
    /// Drive a headless surface for a number of frames and report its state.
    Simulate {
        /// File to visualise.
        input: PathBuf,
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of animation ticks to run.
        #[arg(short, long, default_value_t = 100)]
        frames: u32,
        /// Shape to morph towards (cube, cylinder, sphere).
        #[arg(long)]
        shape: Option<Shape>,
        /// Coordinate mode (trigram, layered_digram).
        #[arg(long)]
        mode: Option<Mode>,
        /// Write the report here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
