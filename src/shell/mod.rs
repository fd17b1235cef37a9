//! Terminal front end: a three-page wizard.
//!
//! ```text
//! configure → capture → preview/export
//!     ↑                       │
//!     └──────── new ──────────┘
//! ```
//!
//! The wizard reads from any [`BufRead`] and writes to any [`Write`], so
//! whole sessions can be scripted in tests. Session state lives in one
//! [`Session`] value; the capture thread owns the accumulator until it
//! finishes and hands it back.

mod batch;
mod command;

pub use batch::{capture_to_file, BatchError, BatchReport};
pub use command::{Command, CommandError, HELP};

use crate::accumulate::AccumulateError;
use crate::capture::ScreenSource;
use crate::output::{self, export};
use crate::session::{
    CaptureSession, Clock, OutputConfig, SessionEnd, SessionEvent, SessionOutcome, SessionParams,
    StopSignal,
};
use crate::tonemap::{self, Gamma};
use image::RgbImage;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default file name for `preview` without a path.
pub const DEFAULT_PREVIEW_FILE: &str = "long-exposure-preview.png";

/// Wizard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Configure,
    Capture,
    Preview,
}

/// Everything the shell knows about the current and next session.
#[derive(Debug)]
pub struct Session {
    /// Parameters for the next capture; kept across sessions.
    pub params: SessionParams,
    /// Exponent applied to the average.
    pub gamma: Gamma,
    /// Preview scale, in `(0, 1]`.
    pub preview_scale: f64,
    outcome: Option<SessionOutcome>,
}

impl Session {
    /// Creates a session with no capture result yet.
    pub fn new(params: SessionParams, output: &OutputConfig) -> Self {
        Self {
            params,
            gamma: output.gamma,
            preview_scale: output.preview_scale,
            outcome: None,
        }
    }

    /// Result of the last capture, if one ran.
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// The average tone-mapped with the current gamma.
    pub fn output_image(&self) -> Result<RgbImage, AccumulateError> {
        let average = self
            .outcome
            .as_ref()
            .ok_or(AccumulateError::Empty)?
            .average()?;
        Ok(tonemap::tone_map(average, self.gamma))
    }

    /// Drops the last result before a new capture.
    pub fn reset(&mut self) {
        self.outcome = None;
    }
}

/// Interactive wizard over a line-oriented terminal.
pub struct Wizard<R, W, C, F> {
    input: R,
    output: W,
    clock: C,
    sources: F,
    stop: StopSignal,
    session: Session,
    page: Page,
}

impl<R, W, C, F> Wizard<R, W, C, F>
where
    R: BufRead,
    W: Write,
    C: Clock + Clone + 'static,
    F: FnMut() -> Box<dyn ScreenSource>,
{
    /// Creates a wizard. `sources` makes a fresh screen source per session.
    pub fn new(input: R, output: W, clock: C, sources: F, stop: StopSignal, session: Session) -> Self {
        Self {
            input,
            output,
            clock,
            sources,
            stop,
            session,
            page: Page::Configure,
        }
    }

    /// The page the wizard is on.
    pub fn page(&self) -> Page {
        self.page
    }

    /// Current session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs until the user quits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            tracing::debug!(page = ?self.page, "Entering page");
            self.page = match self.page {
                Page::Configure => {
                    if !self.configure()? {
                        return Ok(());
                    }
                    Page::Capture
                }
                Page::Capture => {
                    self.capture()?;
                    Page::Preview
                }
                Page::Preview => {
                    if !self.preview()? {
                        return Ok(());
                    }
                    self.session.reset();
                    Page::Configure
                }
            };
        }
    }

    /// Reads one trimmed line; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Prompts until a value parses and passes `check`. Empty input keeps `current`.
    fn prompt_value<T, V>(&mut self, label: &str, current: T, check: V) -> io::Result<Option<T>>
    where
        T: FromStr + std::fmt::Display + Copy,
        V: Fn(T) -> Result<(), String>,
    {
        loop {
            let Some(line) = self.prompt(&format!("{label} [{current}]: "))? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(current));
            }
            match line.parse::<T>() {
                Ok(value) => match check(value) {
                    Ok(()) => return Ok(Some(value)),
                    Err(reason) => writeln!(self.output, "  {reason}")?,
                },
                Err(_) => writeln!(self.output, "  {line:?} is not a valid value")?,
            }
        }
    }

    /// Configure page. Returns `false` if the user quit.
    fn configure(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\n== Long Exposure Screenshot ==")?;
        let mut params = self.session.params;

        let Some(interval) = self.prompt_value("Interval (s)", params.interval_secs, |v| {
            SessionParams {
                interval_secs: v,
                ..params
            }
            .validate()
            .map_err(|e| e.to_string())
        })?
        else {
            return Ok(false);
        };
        params.interval_secs = interval;

        let Some(duration) = self.prompt_value("Duration (s)", params.duration_secs, |_| Ok(()))?
        else {
            return Ok(false);
        };
        params.duration_secs = duration;

        let Some(delay) = self.prompt_value("Delay (s)", params.delay_secs, |_| Ok(()))? else {
            return Ok(false);
        };
        params.delay_secs = delay;

        self.session.params = params;

        let Some(answer) = self.prompt("Press Enter to record, or 'q' to quit: ")? else {
            return Ok(false);
        };
        Ok(!matches!(answer.to_ascii_lowercase().as_str(), "q" | "quit" | "exit"))
    }

    /// Capture page: runs one session, printing its progress.
    fn capture(&mut self) -> io::Result<()> {
        self.session.reset();
        let source = (self.sources)();
        let handle = match CaptureSession::start(self.session.params, source, self.clock.clone()) {
            Ok(handle) => handle,
            Err(e) => {
                writeln!(self.output, "Could not start capture: {e}")?;
                return Ok(());
            }
        };

        self.stop.arm(handle.cancel_token());
        writeln!(self.output, "Recording. Press Ctrl-C to stop.")?;
        writeln!(self.output, "Waiting to start...")?;

        let mut printed = Ok(());
        for event in handle.events() {
            if printed.is_ok() {
                printed = self.report(&event);
            }
        }

        let result = handle.wait();
        self.stop.disarm();
        printed?;

        match result {
            Ok(outcome) => self.session.outcome = Some(outcome),
            Err(e) => writeln!(self.output, "Capture failed: {e}")?,
        }
        Ok(())
    }

    fn report(&mut self, event: &SessionEvent) -> io::Result<()> {
        match event {
            SessionEvent::Countdown { remaining } => {
                writeln!(self.output, "starting in {remaining}...")
            }
            SessionEvent::CaptureStarted { duration } => {
                writeln!(self.output, "Time remaining: {} seconds", duration.as_secs())
            }
            SessionEvent::FrameCaptured { frames, remaining } => writeln!(
                self.output,
                "Time remaining: {} seconds ({frames} frames)",
                whole_seconds(*remaining)
            ),
            SessionEvent::Tick { remaining, .. } => writeln!(
                self.output,
                "Time remaining: {} seconds",
                whole_seconds(*remaining)
            ),
            SessionEvent::Finished { frames, end } => {
                writeln!(self.output, "Capturing finished.")?;
                match end {
                    SessionEnd::Completed => {
                        writeln!(self.output, "Averaged {frames} frames.")
                    }
                    SessionEnd::Cancelled => {
                        writeln!(self.output, "Stopped early; averaged {frames} frames.")
                    }
                    SessionEnd::Failed(error) => writeln!(
                        self.output,
                        "Capture failed after {frames} frames: {error}"
                    ),
                }
            }
        }
    }

    /// Preview page. Returns `false` if the user quit, `true` for a new screenshot.
    fn preview(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\n== Preview ==")?;
        self.show_preview()?;
        writeln!(self.output, "Type 'help' for commands.")?;

        loop {
            let Some(line) = self.prompt("> ")? else {
                return Ok(false);
            };
            match line.parse::<Command>() {
                Ok(Command::Gamma(gamma)) => {
                    self.session.gamma = gamma;
                    if !gamma.in_slider_range() {
                        writeln!(
                            self.output,
                            "  note: gamma {gamma} is outside the usual {:.2}-{:.2} range",
                            Gamma::MIN_SLIDER,
                            Gamma::MAX_SLIDER
                        )?;
                    }
                    self.show_preview()?;
                }
                Ok(Command::Save(path)) => self.save(path)?,
                Ok(Command::Preview(path)) => self.write_preview(path)?,
                Ok(Command::New) => return Ok(true),
                Ok(Command::Help) => writeln!(self.output, "{HELP}")?,
                Ok(Command::Quit) => return Ok(false),
                Err(e) => writeln!(self.output, "  {e}")?,
            }
        }
    }

    fn show_preview(&mut self) -> io::Result<()> {
        match self.session.output_image() {
            Ok(image) => {
                let summary = output::summarize(&image);
                writeln!(self.output, "gamma {}: {summary}", self.session.gamma)
            }
            Err(_) => writeln!(self.output, "No frames were captured; nothing to preview."),
        }
    }

    fn save(&mut self, path: Option<PathBuf>) -> io::Result<()> {
        let image = match self.session.output_image() {
            Ok(image) => image,
            Err(_) => return writeln!(self.output, "Nothing to save: no frames were captured."),
        };
        let path = path.unwrap_or_else(|| {
            export::default_save_path(chrono::Local::now(), dirs::home_dir())
        });
        match output::save(&image, &path) {
            Ok(written) => writeln!(
                self.output,
                "Image successfully saved as: {}",
                written.display()
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Save failed");
                writeln!(self.output, "{e}")
            }
        }
    }

    fn write_preview(&mut self, path: Option<PathBuf>) -> io::Result<()> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_PREVIEW_FILE).to_path_buf());
        let image = match self.session.output_image() {
            Ok(image) => image,
            Err(_) => return writeln!(self.output, "Nothing to preview: no frames were captured."),
        };
        let small = output::render(&image, self.session.preview_scale);
        match output::save(&small, &path) {
            Ok(written) => writeln!(
                self.output,
                "Preview ({}x{}) written to {}",
                small.width(),
                small.height(),
                written.display()
            ),
            Err(e) => writeln!(self.output, "{e}"),
        }
    }
}

/// Seconds left, rounded up so the display never shows 0 early.
fn whole_seconds(remaining: Duration) -> u64 {
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
