//! Screen source abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over the OS screen
//! capture facility, allowing for both real display input and synthetic
//! implementations for testing and headless runs.

use super::Frame;
use thiserror::Error;

/// Errors that can occur while capturing the screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("screen capture unavailable: {0}")]
    Unavailable(String),
    #[error("screen source not opened")]
    NotOpen,
}

/// Trait for screen source implementations.
///
/// Sources are moved onto the capture thread, hence `Send`.
pub trait ScreenSource: Send {
    /// Acquires the display handle.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Captures the full screen as it looks right now.
    fn capture(&mut self) -> Result<Frame, CaptureError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Releases the display handle.
    fn close(&mut self);
}

impl<S: ScreenSource + ?Sized> ScreenSource for Box<S> {
    fn open(&mut self) -> Result<(), CaptureError> {
        (**self).open()
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        (**self).capture()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Synthetic screen that generates a deterministic moving gradient.
///
/// Each capture shifts the pattern so averaged output visibly differs
/// from any single frame.
#[derive(Debug)]
pub struct SyntheticScreen {
    width: u32,
    height: u32,
    open: bool,
    sequence: u64,
}

impl SyntheticScreen {
    /// Default synthetic display width.
    pub const DEFAULT_WIDTH: u32 = 320;
    /// Default synthetic display height.
    pub const DEFAULT_HEIGHT: u32 = 200;

    /// Creates a source at the default size.
    pub fn new() -> Self {
        Self::with_dimensions(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }

    /// Creates a source producing `width` x `height` frames.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            open: false,
            sequence: 0,
        }
    }

    /// Sample value at `(x, y, channel)` for the given sequence number.
    pub fn sample(x: u32, y: u32, channel: usize, sequence: u64) -> u8 {
        let shift = sequence.wrapping_mul(16);
        let base = (x as u64 + y as u64 + shift + channel as u64 * 85) % 256;
        base as u8
    }
}

impl Default for SyntheticScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenSource for SyntheticScreen {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::Unavailable(format!(
                "synthetic display has zero size ({}x{})",
                self.width, self.height
            )));
        }
        self.open = true;
        self.sequence = 0;
        tracing::info!(
            width = self.width,
            height = self.height,
            "SyntheticScreen opened"
        );
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        if !self.open {
            return Err(CaptureError::NotOpen);
        }

        let sequence = self.sequence;
        let mut pixels = Vec::with_capacity((self.width * self.height) as usize * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                for channel in 0..3 {
                    pixels.push(Self::sample(x, y, channel, sequence));
                }
            }
        }

        self.sequence += 1;
        Ok(Frame::new(pixels, self.width, self.height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
        tracing::info!("SyntheticScreen closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_screen_lifecycle() {
        let mut screen = SyntheticScreen::with_dimensions(8, 4);

        assert!(!screen.is_open());

        screen.open().unwrap();
        assert!(screen.is_open());

        let frame = screen.capture().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);
        assert_eq!(frame.dimensions(), (8, 4));

        let frame2 = screen.capture().unwrap();
        assert_eq!(frame2.sequence(), 2);
        assert_ne!(frame.pixels(), frame2.pixels());

        screen.close();
        assert!(!screen.is_open());
    }

    #[test]
    fn test_capture_without_open() {
        let mut screen = SyntheticScreen::new();
        assert!(matches!(screen.capture(), Err(CaptureError::NotOpen)));
    }

    #[test]
    fn test_zero_sized_display_is_unavailable() {
        let mut screen = SyntheticScreen::with_dimensions(0, 10);
        assert!(matches!(screen.open(), Err(CaptureError::Unavailable(_))));
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut screen: Box<dyn ScreenSource> = Box::new(SyntheticScreen::with_dimensions(2, 2));
        screen.open().unwrap();
        assert!(screen.is_open());
        assert_eq!(screen.capture().unwrap().pixels().len(), 12);
    }
}
