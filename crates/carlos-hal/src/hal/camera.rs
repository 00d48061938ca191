// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame capture abstraction

use core::fmt;

/// Encoding of a captured frame's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Baseline JPEG
    Jpeg,
    /// Interleaved 8-bit RGB
    Rgb888,
    /// Big-endian packed 5-6-5 RGB, two bytes per pixel
    Rgb565,
    /// One 8-bit luma sample per pixel
    Grayscale,
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Jpeg => "JPEG",
            PixelFormat::Rgb888 => "RGB888",
            PixelFormat::Rgb565 => "RGB565",
            PixelFormat::Grayscale => "GRAYSCALE",
        };
        f.write_str(name)
    }
}

/// One captured frame
///
/// Owned by the camera between `acquire` and `release`; consumers borrow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    format: PixelFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a payload with its nominal geometry
    pub fn new(format: PixelFormat, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            format,
            width,
            height,
            data,
        }
    }

    /// Payload encoding
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Nominal width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Nominal height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for an empty payload
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Camera driver boundary
///
/// Every frame returned by `acquire` must be handed back through `release`
/// exactly once.
pub trait Camera {
    /// Grab the next frame, or `None` when none is available
    fn acquire(&mut self) -> Option<Frame>;

    /// Return a frame buffer to the driver
    fn release(&mut self, frame: Frame);
}

impl<C: Camera + ?Sized> Camera for &mut C {
    fn acquire(&mut self) -> Option<Frame> {
        (**self).acquire()
    }

    fn release(&mut self, frame: Frame) {
        (**self).release(frame)
    }
}
