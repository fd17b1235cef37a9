//! Frame type representing one captured screen image with metadata.

use image::RgbaImage;
use std::time::Instant;

/// Number of interleaved samples per pixel (R, G, B).
pub const CHANNELS: usize = 3;

/// A single captured screen frame.
///
/// Samples are 8-bit RGB, row-major and interleaved. Frames are
/// immutable once produced.
#[derive(Clone)]
pub struct Frame {
    /// Interleaved RGB samples.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number within the producing source.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame from interleaved RGB samples.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Converts an RGBA capture by dropping the alpha channel.
    pub fn from_rgba(image: &RgbaImage, sequence: u64) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image
            .as_raw()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Self::new(pixels, width, height, sequence)
    }

    /// Returns the interleaved RGB samples.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the number of samples implied by the dimensions.
    #[inline]
    pub fn sample_count(&self) -> usize {
        (self.width as usize) * (self.height as usize) * CHANNELS
    }

    /// Validates that the sample buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.sample_count()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("sample_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(vec![0u8; 64 * 48 * 3], 64, 48, 1);

        assert_eq!(frame.dimensions(), (64, 48));
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let frame = Frame::new(vec![0u8; 100], 64, 48, 1);

        assert!(!frame.is_valid());
    }

    #[test]
    fn test_from_rgba_drops_alpha() {
        let rgba = RgbaImage::from_raw(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 0]).unwrap();
        let frame = Frame::from_rgba(&rgba, 7);

        assert_eq!(frame.pixels(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(frame.dimensions(), (2, 1));
        assert!(frame.is_valid());
    }
}
