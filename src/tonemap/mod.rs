//! Pointwise gamma tone mapping.
//!
//! Maps each sample `s` to `round(255 * clamp((s / 255)^gamma, 0, 1))`.
//! The transform is pure, so the same mean can be re-mapped as often as
//! the user changes gamma.

mod gamma;

pub use gamma::Gamma;

use crate::accumulate::AverageImage;
use image::RgbImage;
use thiserror::Error;

/// Tone mapping errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToneError {
    #[error("invalid gamma {0}: must be a finite number greater than zero")]
    InvalidGamma(f64),
    #[error("could not parse gamma from {0:?}")]
    Unparseable(String),
}

/// Applies `gamma` to `image`, producing an 8-bit RGB image.
///
/// Fails with [`ToneError::InvalidGamma`] if `gamma <= 0` or is not finite.
pub fn apply(image: &AverageImage, gamma: f64) -> Result<RgbImage, ToneError> {
    Ok(tone_map(image, Gamma::new(gamma)?))
}

/// Applies a validated gamma to `image`.
pub fn tone_map(image: &AverageImage, gamma: Gamma) -> RgbImage {
    let exponent = gamma.value();
    let mut out = RgbImage::new(image.width(), image.height());
    for (dst, &s) in out.iter_mut().zip(image.samples()) {
        *dst = map_sample(s, exponent);
    }
    out
}

#[inline]
fn map_sample(sample: f64, exponent: f64) -> u8 {
    let normalized = (sample / 255.0).max(0.0);
    let mapped = normalized.powf(exponent).clamp(0.0, 1.0);
    (mapped * 255.0).round() as u8
}
