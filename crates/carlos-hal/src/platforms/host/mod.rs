// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host bench platform
//!
//! Runs the pilot on a development machine: frames come from a directory of
//! JPEG captures, pins are simulated and logged, and the network is stood in
//! for by a recorded policy trace.

mod camera;
mod clock;
mod gpio;
mod replay;

pub use camera::{CameraError, DirectoryCamera};
pub use clock::StdClock;
pub use gpio::{GpioError, SimulatedGpio};
pub use replay::{ReplayEngine, ReplayError, ReplayStep, ReplayTrace};
