//! Capture sessions.
//!
//! A session runs a [`CaptureController`] on its own thread. The thread
//! owns the accumulator exclusively until it finishes; the caller gets it
//! back from [`SessionHandle::wait`]. Progress arrives over a channel, and
//! stop requests go through a shared [`CancelToken`].

mod cancel;
mod clock;
mod config;
mod controller;

pub use cancel::{CancelToken, StopSignal};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, FileConfig, OutputConfig, SessionParams};
pub use controller::{
    CaptureController, ControllerState, SessionEnd, SessionError, SessionEvent, SessionOutcome,
};

use crate::capture::ScreenSource;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Entry point for background capture sessions.
pub struct CaptureSession;

impl CaptureSession {
    /// Spawns a session capturing from `source` on `clock`'s schedule.
    pub fn start<S, C>(
        params: SessionParams,
        source: S,
        clock: C,
    ) -> Result<SessionHandle, SessionError>
    where
        S: ScreenSource + 'static,
        C: Clock + 'static,
    {
        params.validate()?;

        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();
        let controller = CaptureController::new(params, source, clock, cancel.clone()).with_events(tx);

        let worker = thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || controller.run())
            .map_err(|e| SessionError::Spawn(e.to_string()))?;

        Ok(SessionHandle {
            cancel,
            events: rx,
            worker,
        })
    }
}

/// Handle to a running session.
pub struct SessionHandle {
    cancel: CancelToken,
    events: Receiver<SessionEvent>,
    worker: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    /// Requests the session to stop at its next check.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this session, for handing to a stop signal.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Progress events. The channel closes when the session finishes.
    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.events
    }

    /// Whether the capture thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Blocks until the session finishes and takes back its accumulator.
    pub fn wait(self) -> Result<SessionOutcome, SessionError> {
        self.worker.join().map_err(|_| SessionError::WorkerPanicked)
    }
}
