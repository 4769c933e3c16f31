use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Marker: the response payload is in the slot.
pub(crate) const RESPONSE_READY: u32 = 1;
/// Marker: the worker terminated without delivering a response.
pub(crate) const WORKER_GONE: u32 = 2;

/// The completion signal: a single integer cell plus wait/notify.
///
/// Invariant: the cell is 0 while a call is in flight. The worker sets a
/// nonzero marker once the response slot is written; the caller resets it
/// to 0 after draining the slot, restoring the invariant before the next
/// call. The mutex/condvar pair provides the memory-visibility guarantee
/// between the two threads.
pub(crate) struct CompletionSignal {
    cell: Mutex<u32>,
    cond: Condvar,
}

impl CompletionSignal {
    pub(crate) fn new() -> Self {
        Self {
            cell: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    // A poisoned mutex only means a peer thread panicked mid-call; the
    // cell itself is a plain integer and always safe to read.
    fn lock(&self) -> MutexGuard<'_, u32> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the cell back to "call in flight".
    pub(crate) fn reset(&self) {
        *self.lock() = 0;
    }

    /// Set a completion marker and wake one waiter.
    pub(crate) fn set(&self, marker: u32) {
        debug_assert_ne!(marker, 0);
        *self.lock() = marker;
        self.cond.notify_one();
    }

    /// Set `marker` only if no completion is already pending.
    ///
    /// Used by the worker's termination guard so a response that was
    /// delivered but not yet observed is never clobbered.
    pub(crate) fn set_if_clear(&self, marker: u32) {
        let mut cell = self.lock();
        if *cell == 0 {
            *cell = marker;
            self.cond.notify_one();
        }
    }

    /// Block until the cell becomes nonzero; returns the marker.
    pub(crate) fn wait(&self) -> u32 {
        let mut cell = self.lock();
        while *cell == 0 {
            cell = self
                .cond
                .wait(cell)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *cell
    }

    /// Block until the cell becomes nonzero or `timeout` elapses.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Option<u32> {
        let deadline = Instant::now() + timeout;
        let mut cell = self.lock();
        while *cell == 0 {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _timed_out) = self
                .cond
                .wait_timeout(cell, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            cell = guard;
        }
        Some(*cell)
    }
}
