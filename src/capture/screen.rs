//! Primary-monitor capture using the `xcap` crate.
//!
//! Display handles are reacquired on every capture; monitor handles are
//! not `Send` on every platform and the capture thread outlives any one
//! enumeration.

use super::{CaptureError, Frame, ScreenSource};

/// Captures the OS primary monitor.
///
/// Without the `screen` feature this source always reports
/// [`CaptureError::Unavailable`].
#[derive(Debug, Default)]
pub struct PrimaryScreen {
    open: bool,
    #[cfg_attr(not(feature = "screen"), allow(dead_code))]
    sequence: u64,
}

/// Explains how to get a build that can capture the screen.
pub const UNSUPPORTED_HINT: &str = "this build has no screen capture support; \
rebuild with `--features screen` or run with `--synthetic`";

impl PrimaryScreen {
    /// Creates a closed source; the monitor is looked up on `open`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this build can capture the screen at all.
    pub const fn is_supported() -> bool {
        cfg!(feature = "screen")
    }
}

#[cfg(feature = "screen")]
fn primary_monitor() -> Result<xcap::Monitor, CaptureError> {
    let monitors = xcap::Monitor::all()
        .map_err(|e| CaptureError::Unavailable(format!("failed to enumerate monitors: {e}")))?;

    let mut fallback = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            return Ok(monitor);
        }
        if fallback.is_none() {
            fallback = Some(monitor);
        }
    }

    // No monitor reported itself as primary; use the first one.
    fallback.ok_or_else(|| CaptureError::Unavailable("no monitors found".to_string()))
}

#[cfg(feature = "screen")]
impl ScreenSource for PrimaryScreen {
    fn open(&mut self) -> Result<(), CaptureError> {
        let monitor = primary_monitor()?;
        tracing::info!(
            width = monitor.width().unwrap_or(0),
            height = monitor.height().unwrap_or(0),
            "PrimaryScreen opened"
        );
        self.open = true;
        self.sequence = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        if !self.open {
            return Err(CaptureError::NotOpen);
        }

        let image = primary_monitor()?
            .capture_image()
            .map_err(|e| CaptureError::Unavailable(format!("screen capture failed: {e}")))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(CaptureError::Unavailable(
                "captured empty screenshot (missing permission or no display)".to_string(),
            ));
        }

        self.sequence += 1;
        Ok(Frame::from_rgba(&image, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
        tracing::info!("PrimaryScreen closed");
    }
}

#[cfg(not(feature = "screen"))]
impl ScreenSource for PrimaryScreen {
    fn open(&mut self) -> Result<(), CaptureError> {
        Err(CaptureError::Unavailable(UNSUPPORTED_HINT.to_string()))
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        Err(CaptureError::NotOpen)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}
