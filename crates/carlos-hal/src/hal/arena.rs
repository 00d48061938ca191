// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-size tensor arena handed to the inference engine

use thiserror::Error;

/// Arena allocation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// Zero-sized arena requested
    #[error("Tensor arena size must be greater than zero")]
    Empty,

    /// Allocation failed
    #[error("Out of memory: requested {requested_bytes} bytes for the tensor arena")]
    OutOfMemory {
        /// Requested bytes
        requested_bytes: usize,
    },
}

/// Byte region owned for the whole process lifetime
///
/// Allocated once at startup and never resized.
#[derive(Debug)]
pub struct TensorArena {
    bytes: Box<[u8]>,
}

impl TensorArena {
    /// Allocate a zeroed arena of exactly `size` bytes
    ///
    /// # Errors
    /// `ArenaError::OutOfMemory` if the allocator cannot satisfy the request
    pub fn allocate(size: usize) -> Result<Self, ArenaError> {
        if size == 0 {
            return Err(ArenaError::Empty);
        }

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| ArenaError::OutOfMemory { requested_bytes: size })?;
        bytes.resize(size, 0);

        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Arena size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; an arena is never empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw view for engines that place tensors directly in the arena
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}
