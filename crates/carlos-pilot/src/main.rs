// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bench runner: drives the pilot from a directory of recorded frames and a
//! policy trace, with simulated actuator lines.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use carlos_config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError, PilotConfig,
};
use carlos_hal::platforms::host::{DirectoryCamera, ReplayEngine, SimulatedGpio, StdClock};
use carlos_hal::Model;
use carlos_observability::{init_logging, parse_debug_flags, LogFormat};
use carlos_pilot::{Pilot, ShutdownToken};
use clap::Parser;
use tracing::{info, warn};

/// Carlos pilot - camera-to-actuator control loop on the bench host
#[derive(Parser, Debug)]
#[command(name = "carlos-pilot", version, author, long_about = None)]
struct Args {
    /// Configuration file (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of JPEG frames to replay as the camera
    #[arg(short, long)]
    frames: PathBuf,

    /// Policy trace used as the model blob (overrides `[model] path`)
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// RNG seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Log one JSON object per line
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let debug_flags = parse_debug_flags();
    let args = Args::parse_from(std::env::args().filter(|arg| !arg.starts_with("--debug-")));

    let config = resolve_config(&args)?;

    let format = if config.logging.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_logging(&config.logging.level, &debug_flags, format)?;

    info!("Carlos pilot v{}", env!("CARGO_PKG_VERSION"));

    let model_path = config
        .model
        .path
        .clone()
        .context("No policy trace given: pass --trace or set [model] path")?;
    let model = load_model(&model_path)?;

    let camera = DirectoryCamera::open(&args.frames, config.frame.width, config.frame.height)?;
    info!(
        "Camera: {} frames from {}",
        camera.frame_files(),
        args.frames.display()
    );

    let mut pilot: Pilot<_, ReplayEngine, _, _> =
        Pilot::init(&config, &model, camera, SimulatedGpio::new(), StdClock::new())?;

    let shutdown = ShutdownToken::new();
    let handle = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown signal received...");
        handle.cancel();
    })?;

    let final_state = pilot.run(&shutdown, args.ticks)?;
    info!(
        "Pilot {} ({} engine invocations, {} frames served)",
        final_state,
        pilot.binding().engine().invocations(),
        pilot.camera().frames_served()
    );
    Ok(())
}

fn resolve_config(args: &Args) -> Result<PilotConfig> {
    let mut overrides = HashMap::new();
    if let Some(seed) = args.seed {
        overrides.insert("seed".to_string(), seed.to_string());
    }
    if args.verbose {
        overrides.insert("log_level".to_string(), "debug".to_string());
    }
    if args.json_logs {
        overrides.insert("json_logs".to_string(), "true".to_string());
    }
    if let Some(trace) = &args.trace {
        overrides.insert("model_path".to_string(), trace.display().to_string());
    }

    match load_config(args.config.as_deref(), Some(&overrides)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(reason)) if args.config.is_none() => {
            // Logging is not up yet
            eprintln!("{}\nUsing built-in defaults.", reason);
            let mut config = PilotConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            validate_config(&config)?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

fn load_model(path: &Path) -> Result<Model> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read model {}", path.display()))?;
    if bytes.is_empty() {
        warn!("Model file {} is empty", path.display());
    }
    info!("Model: {} ({} bytes)", path.display(), bytes.len());
    Ok(Model::from_vec(bytes))
}
