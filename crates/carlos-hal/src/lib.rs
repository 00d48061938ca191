// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Carlos HAL
//!
//! Hardware abstraction for the Carlos pilot.
//!
//! This crate provides:
//! - **HAL traits** (`hal` module) - camera, inference engine, digital I/O and time
//! - **Platform implementations** (`platforms` module) - a host bench platform and ESP32
//!
//! ## Feature Flags
//!
//! - `host` (default) - directory camera, simulated GPIO, std clock, replay engine
//! - `esp32` - ESP-IDF time and GPIO
//! - `esp32-s3` - ESP32-S3 variant

/// Hardware abstraction traits shared by all platforms.
pub mod hal;

/// Concrete platform implementations.
pub mod platforms;

pub use hal::{
    ArenaError, Camera, Frame, GpioProvider, InferenceEngine, Model, OpResolver,
    Operator, OperatorRegistrationError, PinLevel, PixelFormat, TensorArena, TimeProvider,
    CarlosOpResolver, REQUIRED_OPERATORS,
};

#[cfg(feature = "host")]
pub use platforms::host::{DirectoryCamera, ReplayEngine, SimulatedGpio, StdClock};

#[cfg(feature = "esp32")]
pub use platforms::Esp32Platform;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::hal::*;

    #[cfg(feature = "host")]
    pub use crate::platforms::host::*;

    #[cfg(feature = "esp32")]
    pub use crate::platforms::Esp32Platform;
}
