//! Capture scheduling: countdown, fixed-cadence capture, finish.
//!
//! # Schedule
//!
//! The first frame is taken as soon as capturing starts. Subsequent
//! frames are taken at `k * interval` after the start while elapsed time is
//! below `duration`. A slow capture skips missed ticks instead of bursting.
//! With exact timing a session captures `ceil(duration / interval)` frames.

use super::{CancelToken, Clock, ConfigError, SessionParams};
use crate::accumulate::{AccumulateError, Accumulator, AverageImage};
use crate::capture::{CaptureError, ScreenSource};
use std::sync::mpsc::Sender;
use std::time::Duration;
use thiserror::Error;

/// Longest wait between progress reports while capturing.
const PROGRESS_PERIOD: Duration = Duration::from_secs(1);

/// Errors that end a session early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Accumulate(#[from] AccumulateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to start capture thread: {0}")]
    Spawn(String),
    #[error("capture thread panicked")]
    WorkerPanicked,
}

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    CountingDown { remaining: u64 },
    Capturing { frames: u64 },
    Finished,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// The configured duration elapsed.
    Completed,
    /// Stop was requested.
    Cancelled,
    /// Capture or accumulation failed; earlier frames are kept.
    Failed(SessionError),
}

/// Progress reported to the shell while a session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Countdown { remaining: u64 },
    CaptureStarted { duration: Duration },
    FrameCaptured { frames: u64, remaining: Duration },
    /// Sent at least once a second between captures.
    Tick { frames: u64, remaining: Duration },
    Finished { frames: u64, end: SessionEnd },
}

impl SessionEvent {
    /// Controller state right after this event was emitted.
    pub fn state(&self) -> ControllerState {
        match self {
            SessionEvent::Countdown { remaining } => ControllerState::CountingDown {
                remaining: *remaining,
            },
            SessionEvent::CaptureStarted { .. } => ControllerState::Capturing { frames: 0 },
            SessionEvent::FrameCaptured { frames, .. } | SessionEvent::Tick { frames, .. } => {
                ControllerState::Capturing { frames: *frames }
            }
            SessionEvent::Finished { .. } => ControllerState::Finished,
        }
    }
}

/// Result handed back when the controller finishes.
///
/// Ownership of the accumulator moves to the caller here; the controller
/// never touches it again.
#[derive(Debug)]
pub struct SessionOutcome {
    /// Frames captured before the session ended.
    pub accumulator: Accumulator,
    /// How the session ended.
    pub end: SessionEnd,
}

impl SessionOutcome {
    /// Frames folded into the average.
    pub fn frame_count(&self) -> u64 {
        self.accumulator.frame_count()
    }

    /// The averaged image, or [`AccumulateError::Empty`] if nothing was captured.
    pub fn average(&self) -> Result<&AverageImage, AccumulateError> {
        self.accumulator.current()
    }
}

/// Drives a [`ScreenSource`] on a schedule and averages what it returns.
pub struct CaptureController<S, C> {
    params: SessionParams,
    source: S,
    clock: C,
    cancel: CancelToken,
    events: Option<Sender<SessionEvent>>,
    state: ControllerState,
}

impl<S: ScreenSource, C: Clock> CaptureController<S, C> {
    /// Creates an idle controller. Nothing runs until [`run`](Self::run).
    pub fn new(params: SessionParams, source: S, clock: C, cancel: CancelToken) -> Self {
        Self {
            params,
            source,
            clock,
            cancel,
            events: None,
            state: ControllerState::Idle,
        }
    }

    /// Sends progress events to `sender`.
    pub fn with_events(mut self, sender: Sender<SessionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(sender) = &self.events {
            // The shell may have stopped listening; the session still finishes.
            let _ = sender.send(event);
        }
    }

    /// Runs the session to completion on the current thread.
    pub fn run(mut self) -> SessionOutcome {
        let mut accumulator = Accumulator::new();
        let end = self.run_inner(&mut accumulator);

        self.source.close();
        self.state = ControllerState::Finished;

        let frames = accumulator.frame_count();
        match &end {
            SessionEnd::Failed(error) => {
                tracing::warn!(frames, error = %error, "Capture session failed");
            }
            _ => tracing::info!(frames, end = ?end, "Capture session finished"),
        }
        self.emit(SessionEvent::Finished {
            frames,
            end: end.clone(),
        });

        SessionOutcome { accumulator, end }
    }

    fn run_inner(&mut self, accumulator: &mut Accumulator) -> SessionEnd {
        if let Err(e) = self.params.validate() {
            return SessionEnd::Failed(e.into());
        }
        if let Err(e) = self.source.open() {
            return SessionEnd::Failed(e.into());
        }

        tracing::info!(
            interval_secs = self.params.interval_secs,
            duration_secs = self.params.duration_secs,
            delay_secs = self.params.delay_secs,
            "Capture session started"
        );

        if self.count_down() {
            return SessionEnd::Cancelled;
        }
        self.capture_frames(accumulator)
    }

    /// Returns `true` if cancelled during the countdown.
    fn count_down(&mut self) -> bool {
        for remaining in (1..=self.params.delay_secs).rev() {
            self.state = ControllerState::CountingDown { remaining };
            self.emit(SessionEvent::Countdown { remaining });
            if self.clock.wait(Duration::from_secs(1), &self.cancel) {
                return true;
            }
        }
        false
    }

    fn capture_frames(&mut self, accumulator: &mut Accumulator) -> SessionEnd {
        let duration = self.params.duration();
        let interval = self.params.interval();
        let start = self.clock.now();

        self.state = ControllerState::Capturing { frames: 0 };
        self.emit(SessionEvent::CaptureStarted { duration });

        loop {
            if self.cancel.is_cancelled() {
                return SessionEnd::Cancelled;
            }
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= duration {
                return SessionEnd::Completed;
            }

            let frame = match self.source.capture() {
                Ok(frame) => frame,
                Err(e) => return SessionEnd::Failed(e.into()),
            };
            let frames = match accumulator.add(&frame) {
                Ok(frames) => frames,
                Err(e) => return SessionEnd::Failed(e.into()),
            };

            let elapsed = self.clock.now().saturating_sub(start);
            tracing::debug!(
                frames,
                elapsed_ms = elapsed.as_millis() as u64,
                "Captured frame"
            );
            self.state = ControllerState::Capturing { frames };
            self.emit(SessionEvent::FrameCaptured {
                frames,
                remaining: duration.saturating_sub(elapsed),
            });

            let deadline = next_tick(elapsed, interval).min(duration);
            if self.wait_until(start, deadline, frames) {
                return SessionEnd::Cancelled;
            }
        }
    }

    /// Waits until `deadline` past `start` in slices of at most
    /// [`PROGRESS_PERIOD`], emitting a tick after each slice that ends
    /// short of it. Returns `true` if cancelled.
    fn wait_until(&mut self, start: Duration, deadline: Duration, frames: u64) -> bool {
        let duration = self.params.duration();
        loop {
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= deadline {
                return false;
            }
            if self
                .clock
                .wait((deadline - elapsed).min(PROGRESS_PERIOD), &self.cancel)
            {
                return true;
            }

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed < deadline {
                self.emit(SessionEvent::Tick {
                    frames,
                    remaining: duration.saturating_sub(elapsed),
                });
            }
        }
    }
}

/// First multiple of `interval` strictly after `elapsed`.
fn next_tick(elapsed: Duration, interval: Duration) -> Duration {
    let step = interval.as_nanos().max(1);
    let ticks = elapsed.as_nanos() / step + 1;
    let nanos = ticks.saturating_mul(step);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Frame, SyntheticScreen};
    use crate::session::ManualClock;
    use std::sync::mpsc;

    fn params(interval_secs: f64, duration_secs: u64, delay_secs: u64) -> SessionParams {
        SessionParams {
            interval_secs,
            duration_secs,
            delay_secs,
        }
    }

    /// Wraps a source, advancing virtual time per capture and optionally
    /// cancelling or failing on a given capture.
    struct ScriptedScreen {
        inner: SyntheticScreen,
        clock: ManualClock,
        latency: Duration,
        captures: u64,
        cancel_on: Option<(u64, CancelToken)>,
        fail_on: Option<u64>,
        resize_on: Option<u64>,
    }

    impl ScriptedScreen {
        fn new(clock: &ManualClock) -> Self {
            Self {
                inner: SyntheticScreen::with_dimensions(4, 3),
                clock: clock.clone(),
                latency: Duration::ZERO,
                captures: 0,
                cancel_on: None,
                fail_on: None,
                resize_on: None,
            }
        }
    }

    impl ScreenSource for ScriptedScreen {
        fn open(&mut self) -> Result<(), CaptureError> {
            self.inner.open()
        }

        fn capture(&mut self) -> Result<Frame, CaptureError> {
            self.captures += 1;
            self.clock.advance(self.latency);
            if self.fail_on == Some(self.captures) {
                return Err(CaptureError::Unavailable("display went away".into()));
            }
            if self.resize_on == Some(self.captures) {
                return Ok(Frame::new(vec![0; 2 * 2 * 3], 2, 2, self.captures));
            }
            if let Some((n, token)) = &self.cancel_on {
                if *n == self.captures {
                    token.cancel();
                }
            }
            self.inner.capture()
        }

        fn is_open(&self) -> bool {
            self.inner.is_open()
        }

        fn close(&mut self) {
            self.inner.close()
        }
    }

    fn run(
        params: SessionParams,
        source: ScriptedScreen,
        clock: ManualClock,
        cancel: CancelToken,
    ) -> (SessionOutcome, Vec<SessionEvent>) {
        let (tx, rx) = mpsc::channel();
        let outcome = CaptureController::new(params, source, clock, cancel)
            .with_events(tx)
            .run();
        (outcome, rx.try_iter().collect())
    }

    #[test]
    fn test_two_second_window_one_second_interval() {
        let clock = ManualClock::new();
        let source = ScriptedScreen::new(&clock);
        let (outcome, _) = run(params(1.0, 2, 0), source, clock.clone(), CancelToken::new());

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert_eq!(outcome.frame_count(), 2);
        assert_eq!(clock.now(), Duration::from_secs(2));
    }

    #[test]
    fn test_frame_count_is_ceil_of_duration_over_interval() {
        for (interval, duration) in [(1.0, 10), (0.5, 3), (0.75, 2), (3.0, 10), (0.3, 1), (7.0, 2)] {
            let clock = ManualClock::new();
            let source = ScriptedScreen::new(&clock);
            let p = params(interval, duration, 0);
            let (outcome, _) = run(p, source, clock, CancelToken::new());

            let floor = (duration as f64 / interval).floor() as u64;
            assert!(
                outcome.frame_count() == floor || outcome.frame_count() == floor + 1,
                "interval {interval} duration {duration}: {} frames",
                outcome.frame_count()
            );
            assert_eq!(outcome.frame_count(), p.expected_frames());
        }
    }

    #[test]
    fn test_slow_capture_skips_missed_ticks() {
        let clock = ManualClock::new();
        let mut source = ScriptedScreen::new(&clock);
        source.latency = Duration::from_millis(1500);
        let (outcome, _) = run(params(1.0, 6, 0), source, clock, CancelToken::new());

        // Captures start at t = 0, 2, 4; each takes 1.5s.
        assert_eq!(outcome.end, SessionEnd::Completed);
        assert_eq!(outcome.frame_count(), 3);
    }

    #[test]
    fn test_countdown_events_precede_capture() {
        let clock = ManualClock::new();
        let source = ScriptedScreen::new(&clock);
        let (outcome, events) = run(params(1.0, 1, 3), source, clock.clone(), CancelToken::new());

        assert_eq!(outcome.frame_count(), 1);
        assert_eq!(
            &events[..4],
            &[
                SessionEvent::Countdown { remaining: 3 },
                SessionEvent::Countdown { remaining: 2 },
                SessionEvent::Countdown { remaining: 1 },
                SessionEvent::CaptureStarted {
                    duration: Duration::from_secs(1)
                },
            ]
        );
        assert!(matches!(
            events.last(),
            Some(SessionEvent::Finished {
                frames: 1,
                end: SessionEnd::Completed
            })
        ));
        let states: Vec<_> = events.iter().map(SessionEvent::state).collect();
        assert_eq!(
            states,
            vec![
                ControllerState::CountingDown { remaining: 3 },
                ControllerState::CountingDown { remaining: 2 },
                ControllerState::CountingDown { remaining: 1 },
                ControllerState::Capturing { frames: 0 },
                ControllerState::Capturing { frames: 1 },
                ControllerState::Finished,
            ]
        );
        assert_eq!(clock.now(), Duration::from_secs(4));
    }

    #[test]
    fn test_cancel_mid_capture_keeps_captured_frames() {
        let clock = ManualClock::new();
        let cancel = CancelToken::new();
        let mut source = ScriptedScreen::new(&clock);
        source.cancel_on = Some((3, cancel.clone()));

        let (outcome, _) = run(params(1.0, 10, 0), source, clock.clone(), cancel);

        assert_eq!(outcome.end, SessionEnd::Cancelled);
        assert_eq!(outcome.frame_count(), 3);
        // Cancellation was seen at the wait following frame 3, not a full interval later.
        assert_eq!(clock.now(), Duration::from_secs(2));

        let mut expected = Accumulator::new();
        let mut reference = SyntheticScreen::with_dimensions(4, 3);
        reference.open().unwrap();
        for _ in 0..3 {
            expected.add(&reference.capture().unwrap()).unwrap();
        }
        assert_eq!(outcome.average().unwrap(), expected.current().unwrap());
    }

    #[test]
    fn test_cancel_during_countdown_yields_empty_session() {
        let clock = ManualClock::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let source = ScriptedScreen::new(&clock);

        let (outcome, events) = run(params(1.0, 10, 5), source, clock, cancel);

        assert_eq!(outcome.end, SessionEnd::Cancelled);
        assert_eq!(outcome.frame_count(), 0);
        assert_eq!(outcome.average(), Err(AccumulateError::Empty));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_zero_duration_captures_nothing() {
        let clock = ManualClock::new();
        let source = ScriptedScreen::new(&clock);
        let (outcome, _) = run(params(1.0, 0, 0), source, clock, CancelToken::new());

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert!(outcome.average().is_err());
    }

    #[test]
    fn test_capture_failure_keeps_partial_average() {
        let clock = ManualClock::new();
        let mut source = ScriptedScreen::new(&clock);
        source.fail_on = Some(3);

        let (outcome, _) = run(params(1.0, 10, 0), source, clock, CancelToken::new());

        assert!(matches!(
            outcome.end,
            SessionEnd::Failed(SessionError::Capture(CaptureError::Unavailable(_)))
        ));
        assert_eq!(outcome.frame_count(), 2);
        assert!(outcome.average().is_ok());
    }

    #[test]
    fn test_resolution_change_fails_session() {
        let clock = ManualClock::new();
        let mut source = ScriptedScreen::new(&clock);
        source.resize_on = Some(2);

        let (outcome, _) = run(params(1.0, 10, 0), source, clock, CancelToken::new());

        assert!(matches!(
            outcome.end,
            SessionEnd::Failed(SessionError::Accumulate(
                AccumulateError::DimensionMismatch { .. }
            ))
        ));
        assert_eq!(outcome.frame_count(), 1);
    }

    #[test]
    fn test_unopenable_source_fails_before_capture() {
        let clock = ManualClock::new();
        let mut source = ScriptedScreen::new(&clock);
        source.inner = SyntheticScreen::with_dimensions(0, 0);

        let (outcome, events) = run(params(1.0, 10, 3), source, clock.clone(), CancelToken::new());

        assert!(matches!(outcome.end, SessionEnd::Failed(SessionError::Capture(_))));
        assert_eq!(events.len(), 1);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let clock = ManualClock::new();
        let source = ScriptedScreen::new(&clock);
        let (outcome, _) = run(params(0.0, 10, 0), source, clock, CancelToken::new());

        assert!(matches!(
            outcome.end,
            SessionEnd::Failed(SessionError::Config(ConfigError::InvalidInterval(_)))
        ));
    }

    #[test]
    fn test_state_starts_idle() {
        let clock = ManualClock::new();
        let controller = CaptureController::new(
            SessionParams::default(),
            ScriptedScreen::new(&clock),
            clock,
            CancelToken::new(),
        );
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_long_interval_reports_every_second() {
        let clock = ManualClock::new();
        let source = ScriptedScreen::new(&clock);
        let (outcome, events) = run(params(5.0, 10, 0), source, clock, CancelToken::new());

        assert_eq!(outcome.frame_count(), 2);
        let progress: Vec<(u64, u64)> = events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::FrameCaptured { frames, remaining }
                | SessionEvent::Tick { frames, remaining } => Some((*frames, remaining.as_secs())),
                _ => None,
            })
            .collect();
        assert_eq!(
            progress,
            vec![
                (1, 10),
                (1, 9),
                (1, 8),
                (1, 7),
                (1, 6),
                (2, 5),
                (2, 4),
                (2, 3),
                (2, 2),
                (2, 1),
            ]
        );
    }

    #[test]
    fn test_cancel_between_ticks_stops_promptly() {
        let clock = ManualClock::new();
        let cancel = CancelToken::new();
        let mut source = ScriptedScreen::new(&clock);
        source.cancel_on = Some((1, cancel.clone()));

        let (outcome, events) = run(params(5.0, 10, 0), source, clock.clone(), cancel);

        assert_eq!(outcome.end, SessionEnd::Cancelled);
        assert_eq!(outcome.frame_count(), 1);
        assert_eq!(clock.now(), Duration::ZERO);
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::Tick { .. })));
    }

    #[test]
    fn test_next_tick() {
        let second = Duration::from_secs(1);
        assert_eq!(next_tick(Duration::ZERO, second), second);
        assert_eq!(next_tick(second, second), Duration::from_secs(2));
        assert_eq!(
            next_tick(Duration::from_millis(2500), second),
            Duration::from_secs(3)
        );
    }
}
