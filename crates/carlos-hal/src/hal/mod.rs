// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hardware Abstraction Layer (HAL) trait definitions
//!
//! Every collaborator of the control loop sits behind one of these traits:
//! - Time management (TimeProvider)
//! - Digital outputs (GpioProvider)
//! - Frame capture (Camera)
//! - Neural network execution (InferenceEngine, with its arena and operator registry)

pub mod arena;
pub mod camera;
pub mod engine;
pub mod gpio;
pub mod ops;
pub mod time;

pub use arena::{ArenaError, TensorArena};
pub use camera::{Camera, Frame, PixelFormat};
pub use engine::{InferenceEngine, Model};
pub use gpio::{GpioProvider, PinLevel};
pub use ops::{CarlosOpResolver, OpResolver, Operator, OperatorRegistrationError, REQUIRED_OPERATORS};
pub use time::TimeProvider;
