// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Installs a single console layer. Text output is meant for a serial console
//! or terminal; JSON output is one event per line for capture on a bench host.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Initialize the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence when set; otherwise the filter is built from
/// `level` and the per-crate debug flags.
///
/// # Errors
///
/// Fails if the filter directives are malformed or a global subscriber is
/// already installed.
pub fn init_logging(level: &str, debug_flags: &CrateDebugFlags, format: LogFormat) -> Result<()> {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives)?,
        Err(_) => EnvFilter::try_new(debug_flags.to_filter_string(level))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}
