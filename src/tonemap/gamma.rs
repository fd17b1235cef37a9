//! Validated gamma exponent.

use super::ToneError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Power-law exponent for tone mapping.
///
/// Always finite and strictly positive. Values above 1 darken, values
/// below 1 brighten.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Gamma(f64);

impl Gamma {
    /// Leaves samples unchanged (up to rounding).
    pub const IDENTITY: Gamma = Gamma(1.0);
    /// Lower end of the interactive range.
    pub const MIN_SLIDER: f64 = 0.1;
    /// Upper end of the interactive range.
    pub const MAX_SLIDER: f64 = 2.0;

    /// Validates `value`: it must be finite and positive.
    pub fn new(value: f64) -> Result<Self, ToneError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ToneError::InvalidGamma(value))
        }
    }

    /// Builds a gamma from a slider position, pinned to the interactive range.
    pub fn clamp_to_slider(value: f64) -> Self {
        if value.is_nan() {
            return Self::IDENTITY;
        }
        Self(value.clamp(Self::MIN_SLIDER, Self::MAX_SLIDER))
    }

    /// The exponent as a plain `f64`.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// True when the value lies inside the slider range.
    pub fn in_slider_range(self) -> bool {
        (Self::MIN_SLIDER..=Self::MAX_SLIDER).contains(&self.0)
    }
}

impl Default for Gamma {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f64> for Gamma {
    type Error = ToneError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Gamma> for f64 {
    fn from(gamma: Gamma) -> Self {
        gamma.0
    }
}

impl FromStr for Gamma {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| ToneError::Unparseable(s.trim().to_string()))?;
        Self::new(value)
    }
}
