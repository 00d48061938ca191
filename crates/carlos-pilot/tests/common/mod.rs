//! Common test utilities and helpers

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Cursor;

use carlos_config::PilotConfig;
use carlos_hal::platforms::host::{ReplayStep, ReplayTrace};
use carlos_hal::{Camera, Frame, Model, PixelFormat, TimeProvider};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

pub const WIDTH: u32 = 96;
pub const HEIGHT: u32 = 96;

/// Default configuration with a fixed seed
pub fn test_config() -> PilotConfig {
    let mut config = PilotConfig::default();
    config.control.seed = Some(1);
    config
}

/// Encode a solid-colour JPEG frame in memory
pub fn jpeg_frame(width: u32, height: u32, colour: [u8; 3]) -> Frame {
    let img = RgbImage::from_pixel(width, height, Rgb(colour));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .expect("Failed to encode JPEG fixture");
    Frame::new(PixelFormat::Jpeg, width, height, bytes)
}

/// A JPEG-tagged frame the codec cannot decode
pub fn corrupt_frame() -> Frame {
    Frame::new(PixelFormat::Jpeg, WIDTH, HEIGHT, vec![0u8; 64])
}

/// Model blob replaying the given (gas, steer) distributions
pub fn replay_model(steps: &[([f32; 3], [f32; 3])]) -> Model {
    let steps = steps
        .iter()
        .map(|(gas, steer)| ReplayStep::new(gas.to_vec(), steer.to_vec()))
        .collect();
    ReplayTrace::new(steps)
        .into_model()
        .expect("Failed to serialize replay trace")
}

/// Model blob from explicit steps
pub fn replay_model_with(steps: Vec<ReplayStep>) -> Model {
    ReplayTrace::new(steps)
        .into_model()
        .expect("Failed to serialize replay trace")
}

/// Camera serving a scripted sequence; `None` entries are failed captures
#[derive(Debug, Default)]
pub struct ScriptedCamera {
    script: VecDeque<Option<Frame>>,
    pub acquired: usize,
    pub released: usize,
}

impl ScriptedCamera {
    pub fn new(script: Vec<Option<Frame>>) -> Self {
        Self {
            script: script.into(),
            acquired: 0,
            released: 0,
        }
    }

    pub fn outstanding(&self) -> usize {
        self.acquired - self.released
    }
}

impl Camera for ScriptedCamera {
    fn acquire(&mut self) -> Option<Frame> {
        let frame = self.script.pop_front().flatten();
        if frame.is_some() {
            self.acquired += 1;
        }
        frame
    }

    fn release(&mut self, _frame: Frame) {
        self.released += 1;
    }
}

/// Clock that only moves when asked to delay, or by `advance_per_read`
#[derive(Debug, Default)]
pub struct FakeClock {
    now_us: Cell<u64>,
    step_us: Cell<u64>,
    pub delays_ms: RefCell<Vec<u32>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `get_time_us` call advances time by `us`
    pub fn advance_per_read(&self, us: u64) {
        self.step_us.set(us);
    }

    pub fn delays(&self) -> Vec<u32> {
        self.delays_ms.borrow().clone()
    }
}

impl TimeProvider for FakeClock {
    fn get_time_us(&self) -> u64 {
        let now = self.now_us.get();
        self.now_us.set(now + self.step_us.get());
        now
    }

    fn delay_us(&self, us: u32) {
        self.now_us.set(self.now_us.get() + u64::from(us));
    }

    fn delay_ms(&self, ms: u32) {
        self.delays_ms.borrow_mut().push(ms);
        self.delay_us(ms * 1000);
    }
}

/// Assert that two f32 values are approximately equal
pub fn assert_approx_eq(a: f32, b: f32, epsilon: f32) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} ≈ {}, but difference was {}",
        a,
        b,
        (a - b).abs()
    );
}
