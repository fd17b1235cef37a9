//! Reduced-size previews and a textual summary of an output image.

use image::imageops::{self, FilterType};
use image::RgbImage;
use std::fmt;

/// Downscales `image` by `scale` for display.
///
/// `scale` is clamped to `(0, 1]`. Scaled sides are truncated, so a
/// 7-pixel side halves to 3, and each side keeps at least one pixel.
pub fn render(image: &RgbImage, scale: f64) -> RgbImage {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale.min(1.0)
    } else {
        1.0
    };
    let width = ((f64::from(image.width()) * scale).floor() as u32).max(1);
    let height = ((f64::from(image.height()) * scale).floor() as u32).max(1);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Brightness overview of an output image.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSummary {
    /// Image width.
    pub width: u32,
    /// Image height.
    pub height: u32,
    /// Mean of each channel (R, G, B).
    pub channel_means: [f64; 3],
    /// Darkest and brightest sample across all channels.
    pub min: u8,
    pub max: u8,
}

impl PreviewSummary {
    /// Mean over all channels.
    pub fn mean(&self) -> f64 {
        self.channel_means.iter().sum::<f64>() / 3.0
    }
}

impl fmt::Display for PreviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.channel_means;
        write!(
            f,
            "{}x{}  mean {:.1} (R {:.1} G {:.1} B {:.1})  range {}..={}",
            self.width,
            self.height,
            self.mean(),
            r,
            g,
            b,
            self.min,
            self.max
        )
    }
}

/// Computes per-channel means and the sample range of `image`.
pub fn summarize(image: &RgbImage) -> PreviewSummary {
    let mut sums = [0u64; 3];
    let mut min = u8::MAX;
    let mut max = u8::MIN;

    for pixel in image.pixels() {
        for (sum, &s) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += u64::from(s);
            min = min.min(s);
            max = max.max(s);
        }
    }

    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return PreviewSummary {
            width: image.width(),
            height: image.height(),
            channel_means: [0.0; 3],
            min: 0,
            max: 0,
        };
    }

    PreviewSummary {
        width: image.width(),
        height: image.height(),
        channel_means: sums.map(|s| s as f64 / count as f64),
        min,
        max,
    }
}
