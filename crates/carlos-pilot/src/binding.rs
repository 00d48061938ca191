// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Inference binding
//!
//! Owns the engine and fixes its I/O table once tensors are allocated:
//!
//! | slot         | index | elements        |
//! |--------------|-------|-----------------|
//! | image input  | 0     | width*height*3  |
//! | speed input  | 1     | 1               |
//! | steer input  | 2     | 1               |
//! | gas output   | 0     | 3               |
//! | steer output | 1     | 3               |
//!
//! Shapes are checked at resolve time; the binding is never re-resolved.

use carlos_hal::InferenceEngine;
use thiserror::Error;

/// Image input slot
pub const IMAGE_INPUT: usize = 0;
/// Speed input slot
pub const SPEED_INPUT: usize = 1;
/// Steer input slot
pub const STEER_INPUT: usize = 2;
/// Gas distribution output slot
pub const GAS_OUTPUT: usize = 0;
/// Steer distribution output slot
pub const STEER_OUTPUT: usize = 1;

/// Inputs the network exposes: image, speed, steer
pub const INPUT_SLOTS: usize = 3;
/// Outputs the network exposes: gas, steer
pub const OUTPUT_SLOTS: usize = 2;

/// Classes per action distribution
pub const ACTION_CLASSES: usize = 3;

/// Direction of a tensor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Input,
    Output,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotKind::Input => f.write_str("input"),
            SlotKind::Output => f.write_str("output"),
        }
    }
}

/// Binding failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Engine I/O table has the wrong number of tensors
    #[error("Engine has {actual} {kind} tensors, expected {expected}")]
    SlotCount {
        kind: SlotKind,
        expected: usize,
        actual: usize,
    },

    /// Engine does not expose the slot
    #[error("Engine has no {kind} tensor at index {index}")]
    MissingSlot { kind: SlotKind, index: usize },

    /// Slot exists with the wrong element count
    #[error("{kind} tensor {index} has {actual} elements, expected {expected}")]
    ShapeMismatch {
        kind: SlotKind,
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Engine plus its resolved I/O slots
#[derive(Debug)]
pub struct TensorBinding<E: InferenceEngine> {
    engine: E,
    image_len: usize,
}

impl<E: InferenceEngine> TensorBinding<E> {
    /// Check the engine's I/O table against the expected layout
    ///
    /// Tensors must already be allocated.
    pub fn resolve(mut engine: E, image_len: usize) -> Result<Self, BindingError> {
        check_count(SlotKind::Input, INPUT_SLOTS, engine.input_count())?;
        check_count(SlotKind::Output, OUTPUT_SLOTS, engine.output_count())?;

        let inputs = [(IMAGE_INPUT, image_len), (SPEED_INPUT, 1), (STEER_INPUT, 1)];
        for (index, expected) in inputs {
            let actual = engine
                .input(index)
                .map(|t| t.len())
                .ok_or(BindingError::MissingSlot {
                    kind: SlotKind::Input,
                    index,
                })?;
            check_shape(SlotKind::Input, index, expected, actual)?;
        }

        for index in [GAS_OUTPUT, STEER_OUTPUT] {
            let actual = engine
                .output(index)
                .map(|t| t.len())
                .ok_or(BindingError::MissingSlot {
                    kind: SlotKind::Output,
                    index,
                })?;
            check_shape(SlotKind::Output, index, ACTION_CLASSES, actual)?;
        }

        Ok(Self { engine, image_len })
    }

    /// Image input elements
    pub fn image_len(&self) -> usize {
        self.image_len
    }

    pub fn image_mut(&mut self) -> Result<&mut [f32], BindingError> {
        input_slot(&mut self.engine, IMAGE_INPUT)
    }

    pub fn write_speed(&mut self, speed: f32) -> Result<(), BindingError> {
        input_slot(&mut self.engine, SPEED_INPUT)?[0] = speed;
        Ok(())
    }

    pub fn write_steer(&mut self, steer: f32) -> Result<(), BindingError> {
        input_slot(&mut self.engine, STEER_INPUT)?[0] = steer;
        Ok(())
    }

    /// Run the network once (blocking)
    pub fn invoke(&mut self) -> Result<(), E::Error> {
        self.engine.invoke()
    }

    /// Throttle distribution from the last invocation
    pub fn gas(&self) -> Result<&[f32], BindingError> {
        output_slot(&self.engine, GAS_OUTPUT)
    }

    /// Steering distribution from the last invocation
    pub fn steer(&self) -> Result<&[f32], BindingError> {
        output_slot(&self.engine, STEER_OUTPUT)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

fn check_count(kind: SlotKind, expected: usize, actual: usize) -> Result<(), BindingError> {
    if expected == actual {
        Ok(())
    } else {
        Err(BindingError::SlotCount { kind, expected, actual })
    }
}

fn check_shape(kind: SlotKind, index: usize, expected: usize, actual: usize) -> Result<(), BindingError> {
    if expected == actual {
        Ok(())
    } else {
        Err(BindingError::ShapeMismatch {
            kind,
            index,
            expected,
            actual,
        })
    }
}

fn input_slot<E: InferenceEngine>(engine: &mut E, index: usize) -> Result<&mut [f32], BindingError> {
    engine.input(index).ok_or(BindingError::MissingSlot {
        kind: SlotKind::Input,
        index,
    })
}

fn output_slot<E: InferenceEngine>(engine: &E, index: usize) -> Result<&[f32], BindingError> {
    engine.output(index).ok_or(BindingError::MissingSlot {
        kind: SlotKind::Output,
        index,
    })
}

#[cfg(all(test, feature = "host"))]
mod tests {
    use super::*;
    use carlos_hal::platforms::host::{ReplayEngine, ReplayStep, ReplayTrace};
    use carlos_hal::{Model, Operator, TensorArena, REQUIRED_OPERATORS};

    fn engine(trace: ReplayTrace) -> ReplayEngine {
        let model = trace.into_model().unwrap();
        let arena = TensorArena::allocate(1_000_000).unwrap();
        let mut engine = ReplayEngine::construct(&model, &REQUIRED_OPERATORS, arena).unwrap();
        engine.allocate_tensors().unwrap();
        engine
    }

    fn step() -> ReplayStep {
        ReplayStep::new(vec![0.2, 0.3, 0.5], vec![0.6, 0.3, 0.1])
    }

    #[test]
    fn test_resolve_and_access() {
        let mut binding = TensorBinding::resolve(engine(ReplayTrace::new(vec![step()])), 96 * 96 * 3).unwrap();
        binding.write_speed(1.5).unwrap();
        binding.write_steer(-0.5).unwrap();
        binding.image_mut().unwrap()[0] = 0.25;

        assert_eq!(binding.engine().input_snapshot(SPEED_INPUT).unwrap(), &[1.5]);
        assert_eq!(binding.engine().input_snapshot(STEER_INPUT).unwrap(), &[-0.5]);
        assert_eq!(binding.engine().input_snapshot(IMAGE_INPUT).unwrap()[0], 0.25);

        binding.invoke().unwrap();
        assert_eq!(binding.gas().unwrap(), &[0.2, 0.3, 0.5]);
        assert_eq!(binding.steer().unwrap(), &[0.6, 0.3, 0.1]);
    }

    #[test]
    fn test_image_shape_mismatch() {
        let err = TensorBinding::resolve(engine(ReplayTrace::new(vec![step()])), 64 * 64 * 3).unwrap_err();
        assert_eq!(
            err,
            BindingError::ShapeMismatch {
                kind: SlotKind::Input,
                index: IMAGE_INPUT,
                expected: 64 * 64 * 3,
                actual: 96 * 96 * 3
            }
        );
    }

    #[test]
    fn test_output_class_count_checked() {
        let trace = ReplayTrace {
            classes: 2,
            ..ReplayTrace::new(vec![ReplayStep::new(vec![0.5, 0.5], vec![0.5, 0.5])])
        };
        let err = TensorBinding::resolve(engine(trace), 96 * 96 * 3).unwrap_err();
        assert!(matches!(
            err,
            BindingError::ShapeMismatch {
                kind: SlotKind::Output,
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_unallocated_engine_has_no_slots() {
        let model = ReplayTrace::new(vec![step()]).into_model().unwrap();
        let arena = TensorArena::allocate(1_000_000).unwrap();
        let engine = ReplayEngine::construct(&model, &REQUIRED_OPERATORS, arena).unwrap();
        assert_eq!(
            TensorBinding::resolve(engine, 96 * 96 * 3).unwrap_err(),
            BindingError::MissingSlot {
                kind: SlotKind::Input,
                index: IMAGE_INPUT
            }
        );
    }

    /// Engine with an extra output head
    #[derive(Debug)]
    struct ThreeHeadEngine {
        outputs: Vec<Vec<f32>>,
    }

    impl InferenceEngine for ThreeHeadEngine {
        type Error = std::convert::Infallible;

        fn construct(_model: &Model, _operators: &[Operator], _arena: TensorArena) -> Result<Self, Self::Error> {
            Ok(Self {
                outputs: vec![vec![0.0; ACTION_CLASSES]; 3],
            })
        }

        fn allocate_tensors(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn input_count(&self) -> usize {
            INPUT_SLOTS
        }

        fn output_count(&self) -> usize {
            self.outputs.len()
        }

        fn input(&mut self, _index: usize) -> Option<&mut [f32]> {
            None
        }

        fn output(&self, index: usize) -> Option<&[f32]> {
            self.outputs.get(index).map(Vec::as_slice)
        }

        fn invoke(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_output_count_checked_before_slots() {
        let arena = TensorArena::allocate(16).unwrap();
        let engine = ThreeHeadEngine::construct(&Model::from_static(b""), &REQUIRED_OPERATORS, arena).unwrap();
        assert_eq!(
            TensorBinding::resolve(engine, 96 * 96 * 3).unwrap_err(),
            BindingError::SlotCount {
                kind: SlotKind::Output,
                expected: OUTPUT_SLOTS,
                actual: 3
            }
        );
    }
}
