//! Running pixel-wise mean over a session's frames.
//!
//! The accumulator keeps a single floating-point buffer and a frame count.
//! No frame history is retained, so memory stays constant however long a
//! session runs.

mod average;

pub use average::AverageImage;

use crate::capture::Frame;
use thiserror::Error;

/// Errors raised while accumulating frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulateError {
    #[error("frame is {actual:?} but the session is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("frame sample buffer has {len} bytes, expected {expected}")]
    MalformedFrame { len: usize, expected: usize },
    #[error("no frames have been accumulated")]
    Empty,
}

/// Incremental mean of same-shaped frames.
#[derive(Debug, Default)]
pub struct Accumulator {
    /// Current mean; `None` until the first frame.
    mean: Option<AverageImage>,
    /// Frames folded into `mean`.
    count: u64,
}

impl Accumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the mean and frame count.
    pub fn reset(&mut self) {
        self.mean = None;
        self.count = 0;
    }

    /// Folds one frame into the mean, returning the new frame count.
    ///
    /// Uses `mean += (frame - mean) / n`, which equals
    /// `((n - 1) * mean + frame) / n` without scaling the buffer up first.
    pub fn add(&mut self, frame: &Frame) -> Result<u64, AccumulateError> {
        if !frame.is_valid() {
            return Err(AccumulateError::MalformedFrame {
                len: frame.pixels().len(),
                expected: frame.sample_count(),
            });
        }

        match self.mean.as_mut() {
            None => {
                self.mean = Some(AverageImage::from_frame(frame));
                self.count = 1;
            }
            Some(mean) => {
                if mean.dimensions() != frame.dimensions() {
                    return Err(AccumulateError::DimensionMismatch {
                        expected: mean.dimensions(),
                        actual: frame.dimensions(),
                    });
                }

                self.count += 1;
                let n = self.count as f64;
                for (m, &s) in mean.samples_mut().iter_mut().zip(frame.pixels()) {
                    *m += (f64::from(s) - *m) / n;
                }
            }
        }

        tracing::trace!(
            frames = self.count,
            sequence = frame.sequence(),
            "Accumulated frame"
        );

        Ok(self.count)
    }

    /// Returns the current mean.
    ///
    /// Fails with [`AccumulateError::Empty`] before the first frame.
    pub fn current(&self) -> Result<&AverageImage, AccumulateError> {
        self.mean.as_ref().ok_or(AccumulateError::Empty)
    }

    /// Consumes the accumulator, yielding the mean.
    pub fn into_current(self) -> Result<AverageImage, AccumulateError> {
        self.mean.ok_or(AccumulateError::Empty)
    }

    /// Returns the number of frames accumulated.
    pub fn frame_count(&self) -> u64 {
        self.count
    }

    /// Returns the session dimensions, fixed by the first frame.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.mean.as_ref().map(AverageImage::dimensions)
    }

    /// Whether no frame has been added since the last reset.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
