//! Interruptible sleep for the loop thread.
//!
//! A generation counter guards against lost wake-ups: the loop thread reads the
//! generation before computing its deadline, and [`WakeSignal::wait`] returns at
//! once if a notification has bumped the generation since.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct WakeSignal {
    generation: Mutex<u64>,
    condvar: Condvar,
}

impl WakeSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Wake any sleeping waiter.
    pub(crate) fn notify(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.condvar.notify_all();
    }

    /// Block for up to `timeout` unless notified after `seen` was read.
    ///
    /// Returns `true` when the wait ended before the timeout.
    pub(crate) fn wait(&self, seen: u64, timeout: Duration) -> bool {
        let mut generation = self.generation.lock();
        if *generation != seen {
            return true;
        }
        !self.condvar.wait_for(&mut generation, timeout).timed_out()
    }
}
