//! Long Exposure Screenshot Library
//!
//! Captures the screen at a fixed interval, averages the frames into a
//! single "long exposure" image, and tone-maps the result with an
//! adjustable gamma for preview and export.
//!
//! # Architecture
//!
//! ```text
//! capture → session (schedule + accumulate) → tonemap → output
//!                        ↑
//!                      shell
//! ```
//!
//! # Design Principles
//!
//! - **Constant memory**: the running mean is updated in place; no frame
//!   history is kept
//! - **Single writer**: the capture thread owns the accumulator until it
//!   finishes, then hands it back
//! - **Cooperative stop**: cancellation interrupts the wait between
//!   captures, never a capture in progress
//! - **Pure tone mapping**: gamma can be re-applied to the same mean as
//!   often as needed
//!
//! # Example
//!
//! ```no_run
//! use long_exposure::{
//!     capture::SyntheticScreen,
//!     output,
//!     session::{CaptureSession, SessionParams, SystemClock},
//!     tonemap::{self, Gamma},
//! };
//!
//! let params = SessionParams {
//!     interval_secs: 0.5,
//!     duration_secs: 5,
//!     delay_secs: 0,
//! };
//! let session = CaptureSession::start(params, SyntheticScreen::new(), SystemClock::new()).unwrap();
//!
//! for event in session.events() {
//!     println!("{event:?}");
//! }
//!
//! let outcome = session.wait().unwrap();
//! let image = tonemap::tone_map(outcome.average().unwrap(), Gamma::new(0.8).unwrap());
//! output::save(&image, "exposure.png").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

/// Running mean of captured frames.
pub mod accumulate;
/// Screen sources and frames.
pub mod capture;
/// PNG export and previews.
pub mod output;
/// Session parameters, scheduling and cancellation.
pub mod session;
/// Terminal wizard and one-shot capture.
pub mod shell;
/// Gamma tone mapping.
pub mod tonemap;

// Re-export commonly used types at crate root
pub use accumulate::{AccumulateError, Accumulator, AverageImage};
pub use capture::{CaptureError, Frame, PrimaryScreen, ScreenSource, SyntheticScreen};
pub use output::ExportError;
pub use session::{
    CaptureSession, FileConfig, SessionEnd, SessionError, SessionEvent, SessionOutcome,
    SessionParams,
};
pub use tonemap::{Gamma, ToneError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
