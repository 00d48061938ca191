// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ESP32 platform implementation
//!
//! Time and digital output over ESP-IDF. Supports ESP32 and ESP32-S3 camera
//! boards; pins are raw GPIO numbers.

use esp_idf_hal::delay::FreeRtos;
use esp_idf_sys::{self as sys, esp, EspError};
use tracing::info;

use crate::hal::{GpioProvider, PinLevel, TimeProvider};

/// ESP32 platform structure
pub struct Esp32Platform {
    /// Pins configured as outputs; writes to any other pin are refused
    configured_mask: u64,
}

impl Esp32Platform {
    /// Initialize the ESP-IDF runtime patches
    pub fn init() -> Self {
        sys::link_patches();
        info!("{} platform initialized", Self::chip_model());
        Self { configured_mask: 0 }
    }

    /// Chip model the firmware was built for
    pub fn chip_model() -> &'static str {
        if cfg!(feature = "esp32-s3") {
            "ESP32-S3"
        } else {
            "ESP32"
        }
    }

    fn pin_bit(pin: u32) -> Result<u64, EspError> {
        1u64.checked_shl(pin).ok_or_else(invalid_arg)
    }
}

fn invalid_arg() -> EspError {
    EspError::from_infallible::<{ sys::ESP_ERR_INVALID_ARG as sys::esp_err_t }>()
}

fn invalid_state() -> EspError {
    EspError::from_infallible::<{ sys::ESP_ERR_INVALID_STATE as sys::esp_err_t }>()
}

impl TimeProvider for Esp32Platform {
    fn get_time_us(&self) -> u64 {
        unsafe { sys::esp_timer_get_time() as u64 }
    }

    fn delay_us(&self, us: u32) {
        unsafe { sys::esp_rom_delay_us(us) }
    }

    fn delay_ms(&self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}

impl GpioProvider for Esp32Platform {
    type Pin = u32;
    type Error = EspError;

    fn configure_outputs(&mut self, pins: &[u32]) -> Result<(), EspError> {
        let mut mask = 0u64;
        for &pin in pins {
            mask |= Self::pin_bit(pin)?;
        }
        let config = sys::gpio_config_t {
            pin_bit_mask: mask,
            mode: sys::gpio_mode_t_GPIO_MODE_INPUT_OUTPUT,
            ..Default::default()
        };
        esp!(unsafe { sys::gpio_config(&config) })?;
        self.configured_mask |= mask;
        Ok(())
    }

    fn set_level(&mut self, pin: u32, level: PinLevel) -> Result<(), EspError> {
        if self.configured_mask & Self::pin_bit(pin)? == 0 {
            return Err(invalid_state());
        }
        esp!(unsafe { sys::gpio_set_level(pin as sys::gpio_num_t, level as u32) })
    }

    fn is_high(&self, pin: u32) -> Result<bool, EspError> {
        Ok(unsafe { sys::gpio_get_level(pin as sys::gpio_num_t) } != 0)
    }
}
