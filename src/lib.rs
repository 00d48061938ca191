// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Carlos - camera-driven pilot for a small-scale car
//!
//! Each tick, one 96x96 camera frame plus the current speed and steering
//! estimate are fed to a pre-trained actor network. Throttle and steering
//! directions are sampled from its two output distributions and drive four
//! binary actuator lines.
//!
//! ## Feature Flags
//!
//! - **`host`** (default): bench platform - JPEG directory camera, simulated
//!   GPIO, std clock, policy trace replay engine
//! - **`esp32`** / **`esp32-s3`**: ESP-IDF time and GPIO
//!
//! ## Usage
//!
//! ```rust,no_run
//! use carlos::prelude::*;
//! use carlos::hal::platforms::host::{DirectoryCamera, ReplayEngine, SimulatedGpio, StdClock};
//!
//! let config = carlos::config::load_config(None, None)?;
//! let model = Model::from_vec(std::fs::read("policy_trace.toml")?);
//! let camera = DirectoryCamera::open("frames", config.frame.width, config.frame.height)?;
//!
//! let mut pilot: Pilot<_, ReplayEngine, _, _> =
//!     Pilot::init(&config, &model, camera, SimulatedGpio::new(), StdClock::new())?;
//! pilot.run(&ShutdownToken::new(), Some(100))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: carlos-config, carlos-observability        │
//! │  (TOML + overrides, tracing subscriber)                 │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Platform: carlos-hal                                   │
//! │  (Camera, InferenceEngine, GpioProvider, TimeProvider)  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Control: carlos-pilot                                  │
//! │  (preprocess -> infer -> sample -> actuate)             │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub use carlos_config as config;
pub use carlos_hal as hal;
pub use carlos_observability as observability;
pub use carlos_pilot as pilot;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use carlos_config::PilotConfig;
    pub use carlos_hal::{Camera, Frame, GpioProvider, InferenceEngine, Model, PixelFormat, TimeProvider};
    pub use carlos_pilot::{Action, LoopState, Pilot, PilotError, SetupError, ShutdownToken, TickOutcome};
}
