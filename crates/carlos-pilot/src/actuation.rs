// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Actuation mapping
//!
//! Each axis is a pin pair driven by a tri-state action:
//!
//! | action    | pin A | pin B |
//! |-----------|-------|-------|
//! | Decrement | 1     | 0     |
//! | Hold      | 0     | 0     |
//! | Increment | 0     | 1     |
//!
//! Throttle: A = gas up, B = gas down. Steering: A = left, B = right.
//! The de-asserted pin is always written before the asserted one, so a pair
//! never reads high on both lines, even between two writes.

use std::fmt;

use carlos_config::ActuatorConfig;
use carlos_hal::{GpioProvider, PinLevel};
use tracing::{info, warn};

/// Signed tri-state command for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Action {
    Decrement = -1,
    Hold = 0,
    Increment = 1,
}

impl Action {
    /// Action for a sampled class index (index minus one)
    ///
    /// Indices outside the three classes map to `Hold`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Action::Decrement,
            1 => Action::Hold,
            2 => Action::Increment,
            other => {
                warn!("Sampled index {} outside action classes, holding", other);
                Action::Hold
            }
        }
    }

    /// -1, 0 or +1
    pub fn value(self) -> i8 {
        self as i8
    }

    /// Levels for (pin A, pin B)
    pub fn levels(self) -> (PinLevel, PinLevel) {
        match self {
            Action::Decrement => (PinLevel::High, PinLevel::Low),
            Action::Hold => (PinLevel::Low, PinLevel::Low),
            Action::Increment => (PinLevel::Low, PinLevel::High),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.value())
    }
}

/// Pin pair of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisPins<P> {
    /// Asserted on `Decrement`
    pub a: P,
    /// Asserted on `Increment`
    pub b: P,
}

/// All four actuator lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorPins<P> {
    pub gas: AxisPins<P>,
    pub steer: AxisPins<P>,
}

impl<P: Copy> ActuatorPins<P> {
    pub fn all(&self) -> [P; 4] {
        [self.gas.a, self.gas.b, self.steer.a, self.steer.b]
    }
}

impl<P: From<u32>> From<&ActuatorConfig> for ActuatorPins<P> {
    fn from(config: &ActuatorConfig) -> Self {
        Self {
            gas: AxisPins {
                a: P::from(config.gas_up_pin),
                b: P::from(config.gas_down_pin),
            },
            steer: AxisPins {
                a: P::from(config.steer_left_pin),
                b: P::from(config.steer_right_pin),
            },
        }
    }
}

/// One-line glyph summary: `"{<} {>}\t{V} {A}"`, blanks for idle glyphs
pub fn glyph_summary(gas: Action, steer: Action) -> String {
    let glyph = |on: bool, c: char| if on { c } else { ' ' };
    format!(
        "{} {}\t{} {}",
        glyph(steer == Action::Decrement, '<'),
        glyph(steer == Action::Increment, '>'),
        glyph(gas == Action::Decrement, 'V'),
        glyph(gas == Action::Increment, 'A'),
    )
}

/// Turns sampled indices into pin levels
#[derive(Debug, Clone)]
pub struct ActuationMapper<P> {
    pins: ActuatorPins<P>,
}

impl<P: Copy + fmt::Debug> ActuationMapper<P> {
    pub fn new(pins: ActuatorPins<P>) -> Self {
        Self { pins }
    }

    pub fn pins(&self) -> &ActuatorPins<P> {
        &self.pins
    }

    /// Map sampled indices to actions and drive both axes
    pub fn map<G>(&self, gpio: &mut G, gas_index: usize, steer_index: usize) -> Result<(Action, Action), G::Error>
    where
        G: GpioProvider<Pin = P>,
    {
        let gas = Action::from_index(gas_index);
        let steer = Action::from_index(steer_index);
        self.apply(gpio, gas, steer)?;
        info!("{}", glyph_summary(gas, steer));
        Ok((gas, steer))
    }

    /// Drive both axes to the given actions
    pub fn apply<G>(&self, gpio: &mut G, gas: Action, steer: Action) -> Result<(), G::Error>
    where
        G: GpioProvider<Pin = P>,
    {
        drive_axis(gpio, &self.pins.gas, gas)?;
        drive_axis(gpio, &self.pins.steer, steer)
    }

    /// All four lines low
    pub fn park<G>(&self, gpio: &mut G) -> Result<(), G::Error>
    where
        G: GpioProvider<Pin = P>,
    {
        self.apply(gpio, Action::Hold, Action::Hold)
    }
}

fn drive_axis<G: GpioProvider>(gpio: &mut G, pins: &AxisPins<G::Pin>, action: Action) -> Result<(), G::Error> {
    let (a, b) = action.levels();
    if a.is_high() {
        gpio.set_level(pins.b, b)?;
        gpio.set_level(pins.a, a)
    } else {
        gpio.set_level(pins.a, a)?;
        gpio.set_level(pins.b, b)
    }
}
