//! Floating-point image buffer holding per-sample means.

use crate::capture::{Frame, CHANNELS};

/// A same-shaped RGB buffer of `f64` samples in `[0, 255]`.
///
/// This is the running mean of a session. It is also the input to tone
/// mapping, so single frames can be lifted into it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageImage {
    width: u32,
    height: u32,
    samples: Vec<f64>,
}

impl AverageImage {
    /// Lifts a frame into floating point without changing its values.
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            samples: frame.pixels().iter().map(|&s| f64::from(s)).collect(),
        }
    }

    /// Builds an image from raw samples.
    ///
    /// Returns `None` if `samples.len() != width * height * 3`.
    pub fn from_samples(width: u32, height: u32, samples: Vec<f64>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * CHANNELS;
        (samples.len() == expected).then_some(Self {
            width,
            height,
            samples,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Interleaved RGB samples.
    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub(super) fn samples_mut(&mut self) -> &mut [f64] {
        &mut self.samples
    }

    /// Returns the sample at pixel `(x, y)` in `channel`.
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> Option<f64> {
        if x >= self.width || y >= self.height || channel >= CHANNELS {
            return None;
        }
        let index = ((y as usize) * (self.width as usize) + x as usize) * CHANNELS + channel;
        self.samples.get(index).copied()
    }
}
