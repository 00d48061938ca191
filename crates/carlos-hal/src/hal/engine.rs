// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Inference engine abstraction
//!
//! The engine is a fixed-operator interpreter that runs a pre-compiled model
//! against a caller-supplied arena. Tensor storage belongs to the engine; the
//! caller reaches it through indexed input/output slots once tensors are
//! allocated.

use std::borrow::Cow;

use crate::hal::arena::TensorArena;
use crate::hal::ops::Operator;

/// Opaque pre-trained model blob
///
/// Firmware builds embed the blob with `include_bytes!`; bench builds load it
/// from disk.
#[derive(Debug, Clone)]
pub struct Model {
    bytes: Cow<'static, [u8]>,
}

impl Model {
    /// Wrap a statically embedded model
    pub const fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            bytes: Cow::Borrowed(bytes),
        }
    }

    /// Wrap a model loaded at runtime
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Cow::Owned(bytes),
        }
    }

    /// Raw model bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Blob size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for an empty blob
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Neural network interpreter boundary
pub trait InferenceEngine: Sized {
    /// Engine-specific error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build an interpreter for `model` that may only use `operators`
    ///
    /// The arena is moved into the engine and lives as long as it does.
    fn construct(model: &Model, operators: &[Operator], arena: TensorArena) -> Result<Self, Self::Error>;

    /// Plan and allocate tensor storage inside the arena
    fn allocate_tensors(&mut self) -> Result<(), Self::Error>;

    /// Number of input tensors
    fn input_count(&self) -> usize;

    /// Number of output tensors
    fn output_count(&self) -> usize;

    /// Mutable view of input tensor `index`
    ///
    /// `None` if the index is out of range or tensors are not yet allocated.
    fn input(&mut self, index: usize) -> Option<&mut [f32]>;

    /// View of output tensor `index`
    ///
    /// `None` if the index is out of range or tensors are not yet allocated.
    fn output(&self, index: usize) -> Option<&[f32]>;

    /// Run the model once over the current inputs (blocking)
    fn invoke(&mut self) -> Result<(), Self::Error>;

    /// Arena bytes actually used after allocation, if the engine tracks it
    fn arena_used_bytes(&self) -> Option<usize> {
        None
    }
}
