// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Platform implementations
//!
//! Each platform module implements the HAL traits defined in `crate::hal`.
//!
//! Available platforms:
//! - Host bench (std): recorded frames, simulated pins, policy trace replay
//! - ESP32 family (ESP32, ESP32-S3): time and GPIO over ESP-IDF

#[cfg(feature = "host")]
pub mod host;

#[cfg(feature = "esp32")]
pub mod esp32;

#[cfg(feature = "esp32")]
pub use esp32::Esp32Platform;
