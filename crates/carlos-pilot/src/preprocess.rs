// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame preprocessing
//!
//! Turns a captured frame plus the two proprioceptive scalars into the input
//! tensor layout the actor network expects:
//! - image: interleaved RGB, row-major, each byte divided by 255.0
//! - speed, steer: copied raw, no normalization
//!
//! A frame that fails to decode leaves the image slot holding the previous
//! cycle's pixels. The scalars are always written.

use carlos_hal::{Frame, InferenceEngine, PixelFormat};
use image::ImageFormat;
use thiserror::Error;
use tracing::{error, trace};

use crate::binding::{BindingError, TensorBinding};

/// Frame decoding failures (transient, never abort a tick)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// JPEG codec rejected the payload
    #[error("Codec error: {0}")]
    Codec(String),

    /// Decoded geometry differs from the network's input geometry
    #[error("Frame is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Raw payload shorter or longer than its format requires
    #[error("{format} payload is {actual} bytes, expected {expected}")]
    PayloadLength {
        format: PixelFormat,
        expected: usize,
        actual: usize,
    },

    /// Output buffer cannot hold the decoded image
    #[error("Decode buffer holds {available} bytes, {required} required")]
    BufferTooSmall { required: usize, available: usize },
}

/// Decode `frame` into interleaved RGB888 in `out`
///
/// `out` must hold at least `width * height * 3` bytes; only that prefix is
/// written.
pub fn decode_rgb888(frame: &Frame, width: u32, height: u32, out: &mut [u8]) -> Result<(), DecodeError> {
    let pixels = width as usize * height as usize;
    let required = pixels * 3;
    if out.len() < required {
        return Err(DecodeError::BufferTooSmall {
            required,
            available: out.len(),
        });
    }
    let out = &mut out[..required];

    match frame.format() {
        PixelFormat::Jpeg => {
            let decoded = image::load_from_memory_with_format(frame.data(), ImageFormat::Jpeg)
                .map_err(|e| DecodeError::Codec(e.to_string()))?;
            if decoded.width() != width || decoded.height() != height {
                return Err(DecodeError::DimensionMismatch {
                    expected_width: width,
                    expected_height: height,
                    actual_width: decoded.width(),
                    actual_height: decoded.height(),
                });
            }
            out.copy_from_slice(decoded.to_rgb8().as_raw());
        }
        PixelFormat::Rgb888 => {
            check_raw(frame, width, height, 3)?;
            out.copy_from_slice(frame.data());
        }
        PixelFormat::Rgb565 => {
            check_raw(frame, width, height, 2)?;
            for (rgb, packed) in out.chunks_exact_mut(3).zip(frame.data().chunks_exact(2)) {
                let value = u16::from_be_bytes([packed[0], packed[1]]);
                let r = ((value >> 11) & 0x1f) as u8;
                let g = ((value >> 5) & 0x3f) as u8;
                let b = (value & 0x1f) as u8;
                rgb[0] = (r << 3) | (r >> 2);
                rgb[1] = (g << 2) | (g >> 4);
                rgb[2] = (b << 3) | (b >> 2);
            }
        }
        PixelFormat::Grayscale => {
            check_raw(frame, width, height, 1)?;
            for (rgb, &luma) in out.chunks_exact_mut(3).zip(frame.data()) {
                rgb.fill(luma);
            }
        }
    }

    Ok(())
}

fn check_raw(frame: &Frame, width: u32, height: u32, bytes_per_pixel: usize) -> Result<(), DecodeError> {
    if frame.width() != width || frame.height() != height {
        return Err(DecodeError::DimensionMismatch {
            expected_width: width,
            expected_height: height,
            actual_width: frame.width(),
            actual_height: frame.height(),
        });
    }
    let expected = width as usize * height as usize * bytes_per_pixel;
    if frame.len() != expected {
        return Err(DecodeError::PayloadLength {
            format: frame.format(),
            expected,
            actual: frame.len(),
        });
    }
    Ok(())
}

/// Writes one cycle's inputs into the bound tensors
///
/// Owns the decoded image scratch buffer, allocated once and reused.
#[derive(Debug)]
pub struct Preprocessor {
    width: u32,
    height: u32,
    decoded: Vec<u8>,
    decode_failures: u64,
}

impl Preprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            decoded: vec![0; width as usize * height as usize * 3],
            decode_failures: 0,
        }
    }

    /// Last successfully decoded RGB888 image
    pub fn decoded(&self) -> &[u8] {
        &self.decoded
    }

    /// Frames that failed to decode so far
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    /// Write `speed`, `steer` and the decoded `frame` into the input tensors
    ///
    /// Decode failures are logged and counted; the image slot then keeps its
    /// previous contents. Only a broken binding is reported as an error.
    pub fn preprocess<E: InferenceEngine>(
        &mut self,
        frame: &Frame,
        speed: f32,
        steer: f32,
        binding: &mut TensorBinding<E>,
    ) -> Result<(), BindingError> {
        binding.write_speed(speed)?;
        binding.write_steer(steer)?;

        if let Err(e) = decode_rgb888(frame, self.width, self.height, &mut self.decoded) {
            self.decode_failures += 1;
            error!("Image decode failed ({} frame, {} bytes): {}", frame.format(), frame.len(), e);
            return Ok(());
        }

        let image = binding.image_mut()?;
        for (dst, &src) in image.iter_mut().zip(&self.decoded) {
            *dst = src as f32 / 255.0;
        }
        trace!("Wrote {} image elements", image.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, luma: u8) -> Frame {
        Frame::new(
            PixelFormat::Grayscale,
            width,
            height,
            vec![luma; (width * height) as usize],
        )
    }

    #[test]
    fn test_grayscale_expands_to_rgb() {
        let mut out = vec![0u8; 2 * 2 * 3];
        decode_rgb888(&gray(2, 2, 77), 2, 2, &mut out).unwrap();
        assert!(out.iter().all(|&b| b == 77));
    }

    #[test]
    fn test_rgb565_channel_expansion() {
        // pure red, pure green, pure blue, white
        let data = vec![0xF8, 0x00, 0x07, 0xE0, 0x00, 0x1F, 0xFF, 0xFF];
        let frame = Frame::new(PixelFormat::Rgb565, 2, 2, data);
        let mut out = vec![0u8; 12];
        decode_rgb888(&frame, 2, 2, &mut out).unwrap();
        assert_eq!(out, vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255]);
    }

    #[test]
    fn test_rgb888_passthrough() {
        let data: Vec<u8> = (0..12).collect();
        let frame = Frame::new(PixelFormat::Rgb888, 2, 2, data.clone());
        let mut out = vec![0u8; 12];
        decode_rgb888(&frame, 2, 2, &mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_raw_payload_length_checked() {
        let frame = Frame::new(PixelFormat::Rgb888, 2, 2, vec![0; 11]);
        let mut out = vec![0u8; 12];
        assert_eq!(
            decode_rgb888(&frame, 2, 2, &mut out),
            Err(DecodeError::PayloadLength {
                format: PixelFormat::Rgb888,
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_geometry_mismatch() {
        let mut out = vec![0u8; 96 * 96 * 3];
        let err = decode_rgb888(&gray(4, 4, 0), 96, 96, &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::DimensionMismatch { actual_width: 4, .. }));
    }

    #[test]
    fn test_garbage_jpeg_is_codec_error() {
        let frame = Frame::new(PixelFormat::Jpeg, 2, 2, vec![0xde, 0xad, 0xbe, 0xef]);
        let mut out = vec![0u8; 12];
        assert!(matches!(
            decode_rgb888(&frame, 2, 2, &mut out),
            Err(DecodeError::Codec(_))
        ));
    }

    #[test]
    fn test_buffer_too_small() {
        let mut out = vec![0u8; 5];
        assert_eq!(
            decode_rgb888(&gray(2, 2, 0), 2, 2, &mut out),
            Err(DecodeError::BufferTooSmall {
                required: 12,
                available: 5
            })
        );
    }
}
