// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Policy trace replay engine
//!
//! Stands in for the interpreter on the bench. The "model blob" is a TOML
//! trace of recorded network outputs; each invocation publishes the next
//! step's gas and steer distributions. The engine keeps the interpreter's
//! setup contract: it refuses to build without the full operator set, charges
//! its tensors against the arena, and exposes the same three inputs and two
//! outputs as the actor network.
//!
//! ```toml
//! image_width = 96
//! image_height = 96
//!
//! [[step]]
//! gas = [0.1, 0.2, 0.7]
//! steer = [0.3, 0.4, 0.3]
//!
//! [[step]]
//! fail = true          # invocation error, for fault drills
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::hal::{InferenceEngine, Model, Operator, TensorArena, REQUIRED_OPERATORS};

const INPUT_COUNT: usize = 3;
const OUTPUT_COUNT: usize = 2;

/// Replay engine errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    /// Trace could not be parsed or is inconsistent
    #[error("Invalid policy trace: {0}")]
    InvalidTrace(String),

    /// Operator registry lacks an operator the network needs
    #[error("Operator {0} is not registered")]
    MissingOperator(Operator),

    /// Tensors do not fit in the arena
    #[error("Arena too small: tensors need {required} bytes, arena holds {available}")]
    ArenaExhausted {
        /// Bytes needed
        required: usize,
        /// Arena size
        available: usize,
    },

    /// `invoke` before `allocate_tensors`
    #[error("Tensors have not been allocated")]
    NotAllocated,

    /// Step marked `fail = true`
    #[error("Scripted invocation failure at step {step}")]
    ScriptedFailure {
        /// Step index within the trace
        step: usize,
    },
}

/// One recorded network evaluation
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplayStep {
    /// Throttle distribution
    pub gas: Vec<f32>,
    /// Steering distribution
    pub steer: Vec<f32>,
    /// Fail this invocation instead of producing outputs
    pub fail: bool,
}

impl ReplayStep {
    /// Step producing the given distributions
    pub fn new(gas: Vec<f32>, steer: Vec<f32>) -> Self {
        Self {
            gas,
            steer,
            fail: false,
        }
    }

    /// Step whose invocation fails
    pub fn failure() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

/// Recorded policy outputs plus the input geometry they were captured with
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplayTrace {
    /// Image input width
    pub image_width: u32,
    /// Image input height
    pub image_height: u32,
    /// Classes per output distribution
    pub classes: usize,
    /// Steps, replayed in a loop
    #[serde(rename = "step")]
    pub steps: Vec<ReplayStep>,
}

impl Default for ReplayTrace {
    fn default() -> Self {
        Self {
            image_width: 96,
            image_height: 96,
            classes: 3,
            steps: Vec::new(),
        }
    }
}

impl ReplayTrace {
    /// Trace for the default 96x96 geometry
    pub fn new(steps: Vec<ReplayStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Parse and check a trace
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        let trace: ReplayTrace =
            toml::from_str(text).map_err(|e| ReplayError::InvalidTrace(e.to_string()))?;
        trace.check()?;
        Ok(trace)
    }

    /// Serialize into a model blob
    pub fn into_model(self) -> Result<Model, ReplayError> {
        let text = toml::to_string(&self).map_err(|e| ReplayError::InvalidTrace(e.to_string()))?;
        Ok(Model::from_vec(text.into_bytes()))
    }

    fn check(&self) -> Result<(), ReplayError> {
        if self.steps.is_empty() {
            return Err(ReplayError::InvalidTrace("trace has no steps".to_string()));
        }
        if self.image_width == 0 || self.image_height == 0 || self.classes == 0 {
            return Err(ReplayError::InvalidTrace(
                "image geometry and class count must be non-zero".to_string(),
            ));
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.fail {
                continue;
            }
            if step.gas.len() != self.classes || step.steer.len() != self.classes {
                return Err(ReplayError::InvalidTrace(format!(
                    "step {} has {}/{} gas/steer classes, expected {}",
                    index,
                    step.gas.len(),
                    step.steer.len(),
                    self.classes
                )));
            }
        }
        Ok(())
    }

    fn input_lens(&self) -> [usize; INPUT_COUNT] {
        [
            self.image_width as usize * self.image_height as usize * 3,
            1,
            1,
        ]
    }

    fn tensor_bytes(&self) -> usize {
        let elements: usize = self.input_lens().iter().sum::<usize>() + OUTPUT_COUNT * self.classes;
        elements * std::mem::size_of::<f32>()
    }
}

/// Bench interpreter replaying a [`ReplayTrace`]
#[derive(Debug)]
pub struct ReplayEngine {
    trace: ReplayTrace,
    arena: TensorArena,
    inputs: Vec<Vec<f32>>,
    outputs: Vec<Vec<f32>>,
    cursor: usize,
    invocations: u64,
}

impl ReplayEngine {
    /// Trace being replayed
    pub fn trace(&self) -> &ReplayTrace {
        &self.trace
    }

    /// Successful and failed invocations so far
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Read-only view of an input tensor, for inspection on the bench
    pub fn input_snapshot(&self, index: usize) -> Option<&[f32]> {
        self.inputs.get(index).map(Vec::as_slice)
    }
}

impl InferenceEngine for ReplayEngine {
    type Error = ReplayError;

    fn construct(model: &Model, operators: &[Operator], arena: TensorArena) -> Result<Self, ReplayError> {
        if let Some(missing) = REQUIRED_OPERATORS.iter().find(|op| !operators.contains(op)) {
            return Err(ReplayError::MissingOperator(*missing));
        }

        let text = std::str::from_utf8(model.as_bytes())
            .map_err(|e| ReplayError::InvalidTrace(e.to_string()))?;
        let trace = ReplayTrace::parse(text)?;

        info!(
            "Replay engine: {} steps, {}x{} image input",
            trace.steps.len(),
            trace.image_width,
            trace.image_height
        );

        Ok(Self {
            trace,
            arena,
            inputs: Vec::new(),
            outputs: Vec::new(),
            cursor: 0,
            invocations: 0,
        })
    }

    fn allocate_tensors(&mut self) -> Result<(), ReplayError> {
        let required = self.trace.tensor_bytes();
        if required > self.arena.len() {
            return Err(ReplayError::ArenaExhausted {
                required,
                available: self.arena.len(),
            });
        }

        self.inputs = self.trace.input_lens().iter().map(|&len| vec![0.0; len]).collect();
        self.outputs = vec![vec![0.0; self.trace.classes]; OUTPUT_COUNT];
        debug!("Allocated {} of {} arena bytes", required, self.arena.len());
        Ok(())
    }

    fn input_count(&self) -> usize {
        INPUT_COUNT
    }

    fn output_count(&self) -> usize {
        OUTPUT_COUNT
    }

    fn input(&mut self, index: usize) -> Option<&mut [f32]> {
        self.inputs.get_mut(index).map(Vec::as_mut_slice)
    }

    fn output(&self, index: usize) -> Option<&[f32]> {
        self.outputs.get(index).map(Vec::as_slice)
    }

    fn invoke(&mut self) -> Result<(), ReplayError> {
        if self.outputs.is_empty() {
            return Err(ReplayError::NotAllocated);
        }

        let step_index = self.cursor % self.trace.steps.len();
        self.cursor = self.cursor.wrapping_add(1);
        self.invocations += 1;

        let step = &self.trace.steps[step_index];
        if step.fail {
            return Err(ReplayError::ScriptedFailure { step: step_index });
        }

        self.outputs[0].copy_from_slice(&step.gas);
        self.outputs[1].copy_from_slice(&step.steer);
        Ok(())
    }

    fn arena_used_bytes(&self) -> Option<usize> {
        (!self.outputs.is_empty()).then(|| self.trace.tensor_bytes())
    }
}
