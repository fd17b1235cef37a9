//! Session parameters and the optional defaults file.
//!
//! Parameters are fixed for the lifetime of a session. The shell keeps the
//! last-used values as defaults for the next one.

use crate::tonemap::Gamma;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Parameters for one capture session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionParams {
    /// Seconds between captures.
    #[serde(rename = "interval")]
    pub interval_secs: f64,
    /// Total capture window in seconds.
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    /// Countdown before capture starts, in seconds.
    #[serde(rename = "delay")]
    pub delay_secs: u64,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            interval_secs: 1.0,
            duration_secs: 10,
            delay_secs: 3,
        }
    }
}

impl SessionParams {
    /// Shortest interval accepted; anything smaller would spin the capture loop.
    pub const MIN_INTERVAL_SECS: f64 = 0.001;

    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = self.interval_secs;
        if !interval.is_finite()
            || interval < Self::MIN_INTERVAL_SECS
            || Duration::try_from_secs_f64(interval).is_err()
        {
            return Err(ConfigError::InvalidInterval(interval));
        }
        Ok(())
    }

    /// Interval between captures.
    ///
    /// Unvalidated intervals that cannot be represented collapse to the
    /// minimum interval.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs)
            .ok()
            .filter(|d| d.as_secs_f64() >= Self::MIN_INTERVAL_SECS)
            .unwrap_or_else(|| Duration::from_secs_f64(Self::MIN_INTERVAL_SECS))
    }

    /// Capture window as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Countdown length as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Frames a session with exact timing would capture: `ceil(duration / interval)`.
    pub fn expected_frames(&self) -> u64 {
        let interval = self.interval().as_nanos();
        let duration = self.duration().as_nanos();
        u64::try_from(duration.div_ceil(interval)).unwrap_or(u64::MAX)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid interval {0}s (must be at least 0.001s)")]
    InvalidInterval(f64),
    #[error("invalid preview scale {0} (must be in (0, 1])")]
    InvalidPreviewScale(f64),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Capture schedule.
    #[serde(default)]
    pub session: SessionParams,
    /// Tone mapping and preview settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Preview and export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Initial tone-mapping exponent.
    pub gamma: Gamma,
    /// Linear scale of the preview render relative to the full image.
    pub preview_scale: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            gamma: Gamma::IDENTITY,
            preview_scale: 0.5,
        }
    }
}

impl OutputConfig {
    /// Checks that the preview scale is in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.preview_scale > 0.0 && self.preview_scale <= 1.0) {
            return Err(ConfigError::InvalidPreviewScale(self.preview_scale));
        }
        Ok(())
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.session.validate()?;
        config.output.validate()?;
        Ok(config)
    }
}
