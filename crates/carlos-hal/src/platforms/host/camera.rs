// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::hal::{Camera, Frame, PixelFormat};

/// Directory camera errors
#[derive(Debug, Error)]
pub enum CameraError {
    /// Directory could not be listed
    #[error("Failed to read frame directory {path}: {source}")]
    Io {
        /// Directory path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Directory holds no JPEG files
    #[error("No .jpg/.jpeg frames found in {0}")]
    NoFrames(PathBuf),
}

/// Camera that replays JPEG captures from a directory
///
/// Files are served in lexical order and the sequence loops. A file that
/// cannot be read yields no frame for that tick.
#[derive(Debug)]
pub struct DirectoryCamera {
    paths: Vec<PathBuf>,
    cursor: usize,
    width: u32,
    height: u32,
    outstanding: usize,
    frames_served: u64,
}

impl DirectoryCamera {
    /// Index the JPEG files in `dir`
    ///
    /// # Arguments
    /// * `dir` - Directory containing `.jpg`/`.jpeg` captures
    /// * `width`, `height` - Nominal frame geometry reported with each frame
    pub fn open(dir: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, CameraError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| CameraError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_jpeg(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(CameraError::NoFrames(dir.to_path_buf()));
        }

        info!("Frame directory {}: {} captures", dir.display(), paths.len());

        Ok(Self {
            paths,
            cursor: 0,
            width,
            height,
            outstanding: 0,
            frames_served: 0,
        })
    }

    /// Number of captures in the rotation
    pub fn frame_files(&self) -> usize {
        self.paths.len()
    }

    /// Frames handed out so far
    pub fn frames_served(&self) -> u64 {
        self.frames_served
    }

    /// Frames acquired but not yet released
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

impl Camera for DirectoryCamera {
    fn acquire(&mut self) -> Option<Frame> {
        let path = &self.paths[self.cursor % self.paths.len()];
        self.cursor = self.cursor.wrapping_add(1);

        match fs::read(path) {
            Ok(bytes) => {
                self.outstanding += 1;
                self.frames_served += 1;
                debug!("Frame {} from {} ({} bytes)", self.frames_served, path.display(), bytes.len());
                Some(Frame::new(PixelFormat::Jpeg, self.width, self.height, bytes))
            }
            Err(e) => {
                warn!("Failed to read capture {}: {}", path.display(), e);
                None
            }
        }
    }

    fn release(&mut self, _frame: Frame) {
        match self.outstanding.checked_sub(1) {
            Some(remaining) => self.outstanding = remaining,
            None => warn!("Frame released that was never acquired"),
        }
    }
}
