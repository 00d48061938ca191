// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Operator registry handed to the inference engine
//!
//! The actor network was compiled against a closed set of seven operators.
//! The registry has a fixed capacity, like the interpreter's mutable op
//! resolver, so registering past capacity fails instead of growing.

use core::fmt;
use thiserror::Error;

/// Operators the interpreter can be asked to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Dense layer
    FullyConnected,
    /// Rectified linear activation
    Relu,
    /// 2D convolution
    Conv2D,
    /// 2D max pooling
    MaxPool2D,
    /// Reshape / flatten
    Reshape,
    /// Tensor concatenation
    Concatenation,
    /// Softmax
    Softmax,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::FullyConnected => "FULLY_CONNECTED",
            Operator::Relu => "RELU",
            Operator::Conv2D => "CONV_2D",
            Operator::MaxPool2D => "MAX_POOL_2D",
            Operator::Reshape => "RESHAPE",
            Operator::Concatenation => "CONCATENATION",
            Operator::Softmax => "SOFTMAX",
        };
        f.write_str(name)
    }
}

/// The operator set the actor network needs, in registration order
pub const REQUIRED_OPERATORS: [Operator; 7] = [
    Operator::FullyConnected,
    Operator::Relu,
    Operator::Conv2D,
    Operator::MaxPool2D,
    Operator::Reshape,
    Operator::Concatenation,
    Operator::Softmax,
];

/// Registration failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OperatorRegistrationError {
    /// Registry capacity exhausted
    #[error("Cannot register {op}: op resolver is full (capacity {capacity})")]
    Full {
        /// Operator that did not fit
        op: Operator,
        /// Registry capacity
        capacity: usize,
    },

    /// Operator already registered
    #[error("Operator {0} is already registered")]
    Duplicate(Operator),
}

/// Fixed-capacity operator registry
#[derive(Debug, Clone, Default)]
pub struct OpResolver<const N: usize = 7> {
    ops: heapless::Vec<Operator, N>,
}

/// Registry sized for exactly the actor network's operator set
pub type CarlosOpResolver = OpResolver<7>;

impl<const N: usize> OpResolver<N> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            ops: heapless::Vec::new(),
        }
    }

    /// Register one operator
    ///
    /// # Errors
    /// `Duplicate` if already present, `Full` if capacity is exhausted
    pub fn register(&mut self, op: Operator) -> Result<(), OperatorRegistrationError> {
        if self.contains(op) {
            return Err(OperatorRegistrationError::Duplicate(op));
        }
        self.ops
            .push(op)
            .map_err(|op| OperatorRegistrationError::Full { op, capacity: N })
    }

    /// Register operators in order, stopping at the first failure
    pub fn register_all(&mut self, ops: &[Operator]) -> Result<(), OperatorRegistrationError> {
        ops.iter().try_for_each(|&op| self.register(op))
    }

    /// True if `op` has been registered
    pub fn contains(&self, op: Operator) -> bool {
        self.ops.contains(&op)
    }

    /// Registered operators in registration order
    pub fn operators(&self) -> &[Operator] {
        &self.ops
    }

    /// Fixed capacity
    pub const fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_required_set() {
        let mut resolver = CarlosOpResolver::new();
        resolver.register_all(&REQUIRED_OPERATORS).unwrap();
        assert_eq!(resolver.operators(), &REQUIRED_OPERATORS);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut resolver = CarlosOpResolver::new();
        resolver.register(Operator::Relu).unwrap();
        assert_eq!(
            resolver.register(Operator::Relu),
            Err(OperatorRegistrationError::Duplicate(Operator::Relu))
        );
    }

    #[test]
    fn test_capacity_overflow_rejected() {
        let mut resolver = OpResolver::<6>::new();
        let err = resolver.register_all(&REQUIRED_OPERATORS).unwrap_err();
        assert_eq!(
            err,
            OperatorRegistrationError::Full {
                op: Operator::Softmax,
                capacity: 6
            }
        );
        assert_eq!(resolver.operators().len(), 6);
    }
}
