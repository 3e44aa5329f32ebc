//! dove-eye CLI: inspect the camera pairing of a rig and manage parameter files.

use clap::{Parser, Subcommand};
use dove_eye::core::pairity;
use dove_eye::{CameraPair, Parameter, ParameterSource, Parameters};
use log::LevelFilter;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dove-eye")]
#[command(about = "Multi-camera rig calibration and tracking utilities")]
#[command(version)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    /// Emit logs as JSON (requires the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical list of unordered camera pairs.
    Pairs {
        /// Number of cameras in the rig.
        #[arg(long)]
        cameras: usize,

        /// Print the pairs as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Create or inspect parameter files.
    Params {
        #[command(subcommand)]
        command: ParamsCommand,
    },
}

#[derive(Subcommand)]
enum ParamsCommand {
    /// Write a parameter file with default values.
    Init {
        /// Destination JSON file.
        path: PathBuf,

        /// Override CALIBRATION_FRAMES.
        #[arg(long)]
        frames: Option<i64>,

        /// Override CALIBRATION_SKIP.
        #[arg(long)]
        skip: Option<i64>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Validate a parameter file and print its values.
    Show {
        /// JSON file to read.
        path: PathBuf,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_json)?;

    match cli.command {
        Commands::Pairs { cameras, json } => run_pairs(cameras, json),
        Commands::Params { command } => match command {
            ParamsCommand::Init {
                path,
                frames,
                skip,
                force,
            } => run_params_init(&path, frames, skip, force),
            ParamsCommand::Show { path } => run_params_show(&path),
        },
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_level: LevelFilter, json: bool) -> CliResult<()> {
    dove_eye::init_tracing(json);
    Ok(())
}

/// `--log-level` sets the baseline; `RUST_LOG` directives refine it.
#[cfg(not(feature = "tracing"))]
fn init_logging(level: LevelFilter, json: bool) -> CliResult<()> {
    if json {
        return Err("--log-json requires the `tracing` feature".into());
    }
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}

// ── pairs ──────────────────────────────────────────────────────────────

fn run_pairs(cameras: usize, json: bool) -> CliResult<()> {
    if cameras == 0 {
        return Err("--cameras must be at least 1".into());
    }
    let pairs = CameraPair::generate_array(cameras);
    log::debug!("generated {} pairs for {cameras} cameras", pairs.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&pairs)?);
        return Ok(());
    }

    println!("{cameras} cameras, {} pairs", pairity(cameras));
    for pair in &pairs {
        println!("  pair {:>3}: camera {} <-> camera {}", pair.index, pair.cam1, pair.cam2);
    }
    Ok(())
}

// ── params ─────────────────────────────────────────────────────────────

fn run_params_init(
    path: &Path,
    frames: Option<i64>,
    skip: Option<i64>,
    force: bool,
) -> CliResult<()> {
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }

    let mut params = Parameters::default();
    if let Some(frames) = frames {
        params.set(Parameter::CalibrationFrames, frames)?;
    }
    if let Some(skip) = skip {
        params.set(Parameter::CalibrationSkip, skip)?;
    }
    params.write_json(path)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn run_params_show(path: &Path) -> CliResult<()> {
    let params = Parameters::load_json(path)?;
    for param in Parameter::ALL {
        println!("{} = {}", param.name(), params.get(param));
    }
    Ok(())
}
