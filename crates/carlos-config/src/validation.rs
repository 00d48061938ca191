// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are within valid ranges and that actuator
//! wiring does not conflict.

use crate::{ConfigError, ConfigResult, PilotConfig};
use std::collections::HashMap;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    PinConflict { pin1: String, pin2: String, pin: u32 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PinConflict { pin1, pin2, pin } => {
                write!(f, "Pin conflict: {} and {} both use GPIO{}", pin1, pin2, pin)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Highest GPIO number on the supported boards (ESP32-S3 GPIO48)
pub const MAX_GPIO_PIN: u32 = 48;

/// Smallest arena that can hold the I/O tensors of the actor network
///
/// Image input plus two scalar inputs plus two 3-class outputs, 4 bytes each.
/// The engine needs scratch space on top of this, so it is a lower bound only.
pub fn min_arena_bytes(config: &PilotConfig) -> usize {
    (config.frame.rgb_len() + 1 + 1 + 3 + 3) * std::mem::size_of::<f32>()
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &PilotConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_frame(config, &mut errors);
    validate_control(config, &mut errors);
    validate_pin_range(config, &mut errors);
    validate_pin_conflicts(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_frame(config: &PilotConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.frame.width == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "frame.width".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if config.frame.height == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "frame.height".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
}

fn validate_control(config: &PilotConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.control.tick_period_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "control.tick_period_ms".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let min_arena = min_arena_bytes(config);
    if config.control.arena_size_bytes < min_arena {
        errors.push(ConfigValidationError::InvalidValue {
            field: "control.arena_size_bytes".to_string(),
            reason: format!(
                "{} bytes cannot hold the I/O tensors ({} bytes minimum)",
                config.control.arena_size_bytes, min_arena
            ),
        });
    }
}

fn validate_pin_range(config: &PilotConfig, errors: &mut Vec<ConfigValidationError>) {
    for (name, pin) in config.actuators.all_pins() {
        if pin > MAX_GPIO_PIN {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("actuators.{}", name),
                reason: format!("GPIO{} is above GPIO{}", pin, MAX_GPIO_PIN),
            });
        }
    }
}

/// Validate that no two actuator lines share a GPIO
fn validate_pin_conflicts(config: &PilotConfig, errors: &mut Vec<ConfigValidationError>) {
    let mut seen: HashMap<u32, &'static str> = HashMap::new();

    for (name, pin) in config.actuators.all_pins() {
        if let Some(previous) = seen.insert(pin, name) {
            errors.push(ConfigValidationError::PinConflict {
                pin1: format!("actuators.{}", previous),
                pin2: format!("actuators.{}", name),
                pin,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_conflict_detected() {
        let mut config = PilotConfig::default();
        config.actuators.steer_right_pin = config.actuators.gas_up_pin;

        let mut errors = Vec::new();
        validate_pin_conflicts(&config, &mut errors);

        assert_eq!(
            errors,
            vec![ConfigValidationError::PinConflict {
                pin1: "actuators.gas_up_pin".to_string(),
                pin2: "actuators.steer_right_pin".to_string(),
                pin: 1,
            }]
        );
    }

    #[test]
    fn test_pin_outside_gpio_range_rejected() {
        let mut config = PilotConfig::default();
        config.actuators.steer_left_pin = 64;

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("actuators.steer_left_pin"));
        assert!(err.contains("GPIO64"));

        config.actuators.steer_left_pin = MAX_GPIO_PIN;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_tick_period_rejected() {
        let mut config = PilotConfig::default();
        config.control.tick_period_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_arena_below_tensor_footprint_rejected() {
        let mut config = PilotConfig::default();
        config.control.arena_size_bytes = min_arena_bytes(&config) - 1;

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("control.arena_size_bytes"));
    }

    #[test]
    fn test_min_arena_bytes_for_default_frame() {
        let config = PilotConfig::default();
        assert_eq!(min_arena_bytes(&config), (96 * 96 * 3 + 8) * 4);
    }
}
