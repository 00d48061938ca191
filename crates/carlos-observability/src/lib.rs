// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # carlos-observability
//!
//! Logging setup shared by the Carlos binaries, with per-crate debug flag support.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known Carlos crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "carlos-config",
    "carlos-hal",
    "carlos-pilot",
];
