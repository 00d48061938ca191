// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `carlos_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PilotConfig {
    pub frame: FrameConfig,
    pub control: ControlConfig,
    pub actuators: ActuatorConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// Camera frame geometry expected by the network's image input
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 96,
            height: 96,
        }
    }
}

impl FrameConfig {
    /// Number of interleaved RGB samples in one decoded frame
    pub fn rgb_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Control loop cadence and memory budget
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Minimum tick period; inference latency may stretch a tick beyond it
    pub tick_period_ms: u32,
    /// Size of the inference engine's tensor arena
    pub arena_size_bytes: usize,
    /// Fixed RNG seed for reproducible action sampling (entropy when absent)
    pub seed: Option<u64>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 100,
            arena_size_bytes: 1_000_000,
            seed: None,
        }
    }
}

/// Digital output pins, two per actuation axis
///
/// The "up" and "left" pins are asserted for the decrement action, the "down"
/// and "right" pins for the increment action.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub gas_up_pin: u32,
    pub gas_down_pin: u32,
    pub steer_left_pin: u32,
    pub steer_right_pin: u32,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            gas_up_pin: 1,
            gas_down_pin: 2,
            steer_left_pin: 3,
            steer_right_pin: 4,
        }
    }
}

impl ActuatorConfig {
    /// All pins with their config key, in wiring order
    pub fn all_pins(&self) -> [(&'static str, u32); 4] {
        [
            ("gas_up_pin", self.gas_up_pin),
            ("gas_down_pin", self.gas_down_pin),
            ("steer_left_pin", self.steer_left_pin),
            ("steer_right_pin", self.steer_right_pin),
        ]
    }
}

/// Model blob location (bench builds only; firmware embeds the model)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: PilotConfig = toml::from_str(
            r#"
            [actuators]
            gas_up_pin = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.actuators.gas_up_pin, 12);
        assert_eq!(config.actuators.gas_down_pin, 2);
        assert_eq!(config.frame, FrameConfig::default());
    }

    #[test]
    fn test_rgb_len() {
        assert_eq!(FrameConfig::default().rgb_len(), 96 * 96 * 3);
    }
}
