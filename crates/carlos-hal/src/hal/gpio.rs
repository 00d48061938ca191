// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinLevel {
    /// Line driven to 0
    Low = 0,
    /// Line driven to 1
    High = 1,
}

impl PinLevel {
    /// True for `High`
    pub fn is_high(self) -> bool {
        self == PinLevel::High
    }
}

/// GPIO abstraction for digital output lines
pub trait GpioProvider {
    /// Platform-specific pin type (must be Copy for ease of use)
    type Pin: Copy + fmt::Debug;

    /// Platform-specific error type
    type Error: fmt::Display;

    /// Configure a set of pins as push-pull outputs
    ///
    /// # Arguments
    /// * `pins` - Pins to configure
    ///
    /// # Returns
    /// Ok(()) or error
    fn configure_outputs(&mut self, pins: &[Self::Pin]) -> Result<(), Self::Error>;

    /// Drive a pin to the given level
    ///
    /// # Arguments
    /// * `pin` - Pin identifier
    /// * `level` - Level to drive
    ///
    /// # Returns
    /// Ok(()) or error
    fn set_level(&mut self, pin: Self::Pin, level: PinLevel) -> Result<(), Self::Error>;

    /// Set pin high
    fn set_high(&mut self, pin: Self::Pin) -> Result<(), Self::Error> {
        self.set_level(pin, PinLevel::High)
    }

    /// Set pin low
    fn set_low(&mut self, pin: Self::Pin) -> Result<(), Self::Error> {
        self.set_level(pin, PinLevel::Low)
    }

    /// Read pin state
    ///
    /// # Returns
    /// True if pin is high, false if low, or error
    fn is_high(&self, pin: Self::Pin) -> Result<bool, Self::Error>;
}

impl<G: GpioProvider + ?Sized> GpioProvider for &mut G {
    type Pin = G::Pin;
    type Error = G::Error;

    fn configure_outputs(&mut self, pins: &[Self::Pin]) -> Result<(), Self::Error> {
        (**self).configure_outputs(pins)
    }

    fn set_level(&mut self, pin: Self::Pin, level: PinLevel) -> Result<(), Self::Error> {
        (**self).set_level(pin, level)
    }

    fn is_high(&self, pin: Self::Pin) -> Result<bool, Self::Error> {
        (**self).is_high(pin)
    }
}
