//! Writing tone-mapped images to disk.

use chrono::{DateTime, TimeZone};
use image::RgbImage;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension added when the chosen path has none.
pub const DEFAULT_EXTENSION: &str = "png";

/// Export errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Error saving file {}: {}", .path.display(), .reason)]
    FileSave {
        /// Path the save was attempted at.
        path: PathBuf,
        /// Message from the encoder or filesystem.
        reason: String,
    },
}

/// Resolves the path an export to `path` will actually write.
pub fn resolve_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(DEFAULT_EXTENSION)
    }
}

/// Default file name for a save made at `now`.
pub fn default_file_name<Tz>(now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("long-exposure-{}.{DEFAULT_EXTENSION}", now.format("%Y%m%d-%H%M%S"))
}

/// Where a save without an explicit path goes: a timestamped name in
/// `home`, or in the current directory when there is no home directory.
pub fn default_save_path<Tz>(now: DateTime<Tz>, home: Option<PathBuf>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    home.unwrap_or_default().join(default_file_name(now))
}

/// Encodes `image` to `path`, inferring the format from the extension.
///
/// Returns the path written. Encoder and I/O failures are reported with
/// their own message as the reason.
pub fn save(image: &RgbImage, path: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
    let path = resolve_path(path);
    image.save(&path).map_err(|e| ExportError::FileSave {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Saved image"
    );
    Ok(path)
}
