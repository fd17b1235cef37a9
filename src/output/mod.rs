//! Image output: file export and previews.

/// Saving images to disk.
pub mod export;
/// Downscaled previews and brightness summaries.
pub mod preview;

pub use export::{save, ExportError};
pub use preview::{render, summarize, PreviewSummary};
