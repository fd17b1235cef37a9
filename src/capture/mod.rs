//! Screen input and frame handling.
//!
//! This module provides abstractions for capturing full-screen frames.
//! The OS capture facility sits behind [`ScreenSource`] so sessions can be
//! driven by synthetic input in tests and on headless machines.

mod frame;
mod screen;
mod source;

pub use frame::{Frame, CHANNELS};
pub use screen::{PrimaryScreen, UNSUPPORTED_HINT};
pub use source::{CaptureError, ScreenSource, SyntheticScreen};
