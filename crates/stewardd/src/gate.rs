//! One-shot latch that parks the orchestrator thread while the daemon serves.

use std::sync::{Condvar, Mutex, PoisonError};

/// Binary latch with `running` and `released` states.
///
/// Each start cycle owns a fresh gate. The first [`RunGate::release`] wakes
/// every waiter; later releases do nothing. A waiter arriving after the
/// release returns immediately, so a stop that races ahead of
/// [`RunGate::wait`] is never lost.
#[derive(Debug, Default)]
pub struct RunGate {
    released: Mutex<bool>,
    wakeup: Condvar,
}

impl RunGate {
    /// Creates a gate in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases the gate, returning `true` only for the call that did so.
    pub fn release(&self) -> bool {
        let mut released = self
            .released
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *released {
            return false;
        }
        *released = true;
        self.wakeup.notify_all();
        true
    }

    /// Blocks until the gate has been released.
    pub fn wait(&self) {
        let released = self
            .released
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _released = self
            .wakeup
            .wait_while(released, |released| !*released)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Reports whether the gate has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        *self
            .released
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
