// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;

use crate::hal::{GpioProvider, PinLevel};

/// Simulated GPIO errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpioError {
    /// Write or read on a pin that was never configured
    #[error("GPIO{0} is not configured as an output")]
    NotConfigured(u32),
}

/// In-memory GPIO bank
///
/// Records the level and write history of every configured pin so bench runs
/// and tests can inspect what the pilot drove.
#[derive(Debug, Default)]
pub struct SimulatedGpio {
    configured: BTreeSet<u32>,
    levels: BTreeMap<u32, PinLevel>,
    history: Vec<(u32, PinLevel)>,
}

impl SimulatedGpio {
    /// Create a bank with no configured pins
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of a pin, `None` if never written
    pub fn level(&self, pin: u32) -> Option<PinLevel> {
        self.levels.get(&pin).copied()
    }

    /// Pins configured as outputs
    pub fn configured_pins(&self) -> impl Iterator<Item = u32> + '_ {
        self.configured.iter().copied()
    }

    /// Every write in order
    pub fn history(&self) -> &[(u32, PinLevel)] {
        &self.history
    }

    /// Number of writes performed
    pub fn write_count(&self) -> usize {
        self.history.len()
    }
}

impl GpioProvider for SimulatedGpio {
    type Pin = u32;
    type Error = GpioError;

    fn configure_outputs(&mut self, pins: &[u32]) -> Result<(), GpioError> {
        debug!("Configuring GPIO outputs: {:?}", pins);
        self.configured.extend(pins.iter().copied());
        Ok(())
    }

    fn set_level(&mut self, pin: u32, level: PinLevel) -> Result<(), GpioError> {
        if !self.configured.contains(&pin) {
            return Err(GpioError::NotConfigured(pin));
        }
        debug!("GPIO{} <- {}", pin, level as u8);
        self.levels.insert(pin, level);
        self.history.push((pin, level));
        Ok(())
    }

    fn is_high(&self, pin: u32) -> Result<bool, GpioError> {
        if !self.configured.contains(&pin) {
            return Err(GpioError::NotConfigured(pin));
        }
        Ok(self.level(pin).is_some_and(PinLevel::is_high))
    }
}
