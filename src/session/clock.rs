//! Time sources for the capture schedule.
//!
//! The controller only asks "what time is it" and "wait this long unless
//! cancelled", so tests can drive it with virtual time.

use super::CancelToken;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Monotonic time source with a cancellable wait.
pub trait Clock: Send {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Waits for `timeout` or until `cancel` fires.
    ///
    /// Returns `true` if cancelled.
    fn wait(&self, timeout: Duration, cancel: &CancelToken) -> bool;
}

/// Wall-clock time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Starts a clock at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait(&self, timeout: Duration, cancel: &CancelToken) -> bool {
        cancel.wait_timeout(timeout)
    }
}

/// Virtual clock that advances only when waited on or told to.
///
/// Clones share the same time, so a test source can simulate capture
/// latency with [`advance`](Self::advance).
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves virtual time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait(&self, timeout: Duration, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            return true;
        }
        self.advance(timeout);
        cancel.is_cancelled()
    }
}
