//! Non-interactive capture straight to a file.

use crate::accumulate::AccumulateError;
use crate::capture::ScreenSource;
use crate::output::{self, ExportError};
use crate::session::{CaptureSession, Clock, SessionEnd, SessionError, SessionParams, StopSignal};
use crate::tonemap::{self, Gamma};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from a one-shot capture.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("nothing to save: {0}")]
    Empty(#[from] AccumulateError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What a batch run produced.
#[derive(Debug)]
pub struct BatchReport {
    /// Where the image was written.
    pub path: PathBuf,
    /// Frames in the average.
    pub frames: u64,
    /// How the session ended.
    pub end: SessionEnd,
}

impl BatchReport {
    /// True if the session ran to its configured duration.
    pub fn is_complete(&self) -> bool {
        self.end == SessionEnd::Completed
    }
}

/// Runs one session and saves the tone-mapped average to `path`.
///
/// A session that stops early still saves whatever it averaged; the
/// report carries how it ended.
pub fn capture_to_file<S, C>(
    params: SessionParams,
    gamma: Gamma,
    source: S,
    clock: C,
    stop: &StopSignal,
    path: &Path,
) -> Result<BatchReport, BatchError>
where
    S: ScreenSource + 'static,
    C: Clock + 'static,
{
    let handle = CaptureSession::start(params, source, clock)?;
    stop.arm(handle.cancel_token());

    for event in handle.events() {
        tracing::debug!(?event, "Session progress");
    }
    let result = handle.wait();
    stop.disarm();
    let outcome = result?;

    if let SessionEnd::Failed(error) = &outcome.end {
        tracing::warn!(error = %error, frames = outcome.frame_count(), "Saving partial exposure");
    }

    let average = match (outcome.average(), &outcome.end) {
        (Ok(average), _) => average,
        // Nothing captured because the session failed: report why.
        (Err(_), SessionEnd::Failed(error)) => return Err(error.clone().into()),
        (Err(e), _) => return Err(e.into()),
    };
    let image = tonemap::tone_map(average, gamma);
    let path = output::save(&image, path)?;

    Ok(BatchReport {
        path,
        frames: outcome.frame_count(),
        end: outcome.end,
    })
}
