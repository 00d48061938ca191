// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Loading is three-tiered:
//! 1. TOML file (base values, defaults for anything missing)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, PilotConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "carlos_configuration.toml";

/// Find the Carlos configuration file
///
/// Search order:
/// 1. `CARLOS_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("CARLOS_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by CARLOS_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet CARLOS_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load, override and validate the configuration
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<PilotConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: PilotConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn cli_value<T: FromStr>(cli_args: &HashMap<String, String>, key: &str) -> Option<T> {
    cli_args.get(key).and_then(|v| v.trim().parse().ok())
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `CARLOS_TICK_PERIOD_MS` -> `control.tick_period_ms`
/// - `CARLOS_ARENA_SIZE_BYTES` -> `control.arena_size_bytes`
/// - `CARLOS_SEED` -> `control.seed`
/// - `CARLOS_LOG_LEVEL` -> `logging.level`
/// - `CARLOS_MODEL_PATH` -> `model.path`
/// - `CARLOS_GAS_UP_PIN`, `CARLOS_GAS_DOWN_PIN`, `CARLOS_STEER_LEFT_PIN`,
///   `CARLOS_STEER_RIGHT_PIN` -> `actuators.*`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut PilotConfig) {
    if let Some(period) = env_value("CARLOS_TICK_PERIOD_MS") {
        config.control.tick_period_ms = period;
    }
    if let Some(size) = env_value("CARLOS_ARENA_SIZE_BYTES") {
        config.control.arena_size_bytes = size;
    }
    if let Some(seed) = env_value("CARLOS_SEED") {
        config.control.seed = Some(seed);
    }
    if let Ok(level) = env::var("CARLOS_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(path) = env::var("CARLOS_MODEL_PATH") {
        config.model.path = Some(PathBuf::from(path));
    }

    if let Some(pin) = env_value("CARLOS_GAS_UP_PIN") {
        config.actuators.gas_up_pin = pin;
    }
    if let Some(pin) = env_value("CARLOS_GAS_DOWN_PIN") {
        config.actuators.gas_down_pin = pin;
    }
    if let Some(pin) = env_value("CARLOS_STEER_LEFT_PIN") {
        config.actuators.steer_left_pin = pin;
    }
    if let Some(pin) = env_value("CARLOS_STEER_RIGHT_PIN") {
        config.actuators.steer_right_pin = pin;
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys mirror the environment variables in snake case without the prefix,
/// e.g. `{"tick_period_ms": "50", "seed": "7"}`.
pub fn apply_cli_overrides(config: &mut PilotConfig, cli_args: &HashMap<String, String>) {
    if let Some(period) = cli_value(cli_args, "tick_period_ms") {
        config.control.tick_period_ms = period;
    }
    if let Some(size) = cli_value(cli_args, "arena_size_bytes") {
        config.control.arena_size_bytes = size;
    }
    if let Some(seed) = cli_value(cli_args, "seed") {
        config.control.seed = Some(seed);
    }
    if let Some(level) = cli_args.get("log_level") {
        config.logging.level = level.clone();
    }
    if let Some(json) = cli_args.get("json_logs") {
        config.logging.json = json.eq_ignore_ascii_case("true") || json == "1";
    }
    if let Some(path) = cli_args.get("model_path") {
        config.model.path = Some(PathBuf::from(path));
    }
}
