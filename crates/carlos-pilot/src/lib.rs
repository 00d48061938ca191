// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Carlos Pilot
//!
//! The perception-to-actuation loop of the Carlos car: one camera frame plus
//! the current speed and steering estimate go through the actor network, two
//! discrete actions are sampled from its outputs, and four binary lines are
//! driven from them, every tick.
//!
//! ```text
//! Frame -> Preprocessor -> TensorBinding (inputs) -> engine.invoke()
//!       -> TensorBinding (outputs) -> Sampler -> ActuationMapper -> pins
//! ```
//!
//! Hardware is reached only through the `carlos-hal` traits, so the same loop
//! runs on the car and on a bench host against recorded frames.

pub mod actuation;
pub mod binding;
pub mod control;
pub mod feedback;
pub mod preprocess;
pub mod sampler;

pub use actuation::{glyph_summary, Action, ActuationMapper, ActuatorPins, AxisPins};
pub use binding::{BindingError, SlotKind, TensorBinding, ACTION_CLASSES};
pub use control::{LoopState, LoopStats, Pilot, PilotError, SetupError, ShutdownToken, TickOutcome};
pub use feedback::{OpenLoop, ProprioceptiveState, StateFeedback};
pub use preprocess::{decode_rgb888, DecodeError, Preprocessor};
pub use sampler::{sample_with, Sampler};
