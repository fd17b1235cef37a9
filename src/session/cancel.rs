//! Cooperative cancellation for capture sessions.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Shared stop flag with an interruptible wait.
///
/// Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests cancellation and wakes any waiter.
    pub fn cancel(&self) {
        *self.flag() = true;
        self.inner.1.notify_all();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Blocks for up to `timeout`, returning early on cancellation.
    ///
    /// Returns `true` if the token is cancelled when the wait ends.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.flag();
        let (guard, _) = self
            .inner
            .1
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Slot holding the token of the session currently running, if any.
///
/// The interrupt handler presses "stop" through this without knowing
/// which session is active.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    slot: Arc<Mutex<Option<CancelToken>>>,
}

impl StopSignal {
    /// Creates an unarmed signal.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<CancelToken>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `token` the target of the next [`trigger`](Self::trigger).
    pub fn arm(&self, token: CancelToken) {
        *self.slot() = Some(token);
    }

    /// Clears the armed token, if any.
    pub fn disarm(&self) {
        *self.slot() = None;
    }

    /// Whether a session is currently armed.
    pub fn is_armed(&self) -> bool {
        self.slot().is_some()
    }

    /// Cancels the armed session. Returns `false` if nothing was armed.
    pub fn trigger(&self) -> bool {
        match self.slot().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
