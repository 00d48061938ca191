// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Carlos Configuration System
//!
//! Type-safe configuration for the Carlos pilot with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use carlos_config::load_config;
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! println!("Tick period: {}ms", config.control.tick_period_ms);
//! ```
//!
//! Every section falls back to the constants the vehicle firmware was trained
//! against (96x96 JPEG frames, 100 ms tick, 1,000,000 byte arena, pins 1-4), so
//! an empty file is a valid configuration.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{min_arena_bytes, validate_config, ConfigValidationError, MAX_GPIO_PIN};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PilotConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: PilotConfig = toml::from_str("").unwrap();
        assert_eq!(config.frame.width, 96);
        assert_eq!(config.control.tick_period_ms, 100);
        assert_eq!(config.control.arena_size_bytes, 1_000_000);
    }
}
