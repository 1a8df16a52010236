//! Adaptive update loop.
//!
//! The loop invokes a callback on a dedicated thread at a stable long-run rate.
//! Each cycle it computes the next deadline from the oldest timestamp in its
//! [`HistoryWindow`], sleeps until then, records the wake-up time, and invokes
//! the callback.
//!
//! # Lifecycle
//!
//! `Created → Running → Stopped`. The loop can be started once; starting it a
//! second time, or after [`AdaptiveLoop::stop`], returns an error and leaves
//! the loop untouched.
//!
//! # Reconfiguration latency
//!
//! [`AdaptiveLoop::set_period`] and [`AdaptiveLoop::stop`] wake the loop thread
//! if it is sleeping, so new settings apply to the very next deadline. A
//! callback that is already executing runs to completion first.

use core::fmt;
use core::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace};

use tickwise_window::HistoryWindow;

use crate::clock::MonotonicClock;
use crate::config::LoopConfig;
use crate::error::{LoopError, LoopResult};
use crate::sleep_time::determine_sleep_time;
use crate::wake::WakeSignal;

type Callback = Box<dyn FnMut(&AdaptiveLoop) + Send + 'static>;

/// Lifecycle state of an [`AdaptiveLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LoopState {
    /// Constructed, not started yet.
    Created = 0,
    /// The loop thread is running cycles.
    Running = 1,
    /// Stop was requested; terminal.
    Stopped = 2,
}

impl LoopState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Created => write!(f, "created"),
            LoopState::Running => write!(f, "running"),
            LoopState::Stopped => write!(f, "stopped"),
        }
    }
}

struct Shared {
    window: HistoryWindow,
    period_ns: AtomicU64,
    state: AtomicU8,
    invocations: AtomicU64,
    callback: Mutex<Option<Callback>>,
    wake: WakeSignal,
    clock: MonotonicClock,
    thread_name: String,
}

/// Marks the loop stopped when the loop thread exits, including by unwinding
/// out of a panicking callback.
struct ExitGuard<'a>(&'a Shared);

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        self.0
            .state
            .store(LoopState::Stopped as u8, Ordering::Release);
    }
}

/// Self-correcting periodic executor.
///
/// `AdaptiveLoop` is a cheap, cloneable handle: every clone controls the same
/// loop. The callback receives a handle as well, so it can stop or reconfigure
/// the loop from inside a cycle.
///
/// Use that handle rather than capturing a clone of the loop in the callback:
/// a captured clone keeps the loop alive through its own callback, and the
/// cycle is only broken once the loop is started or stopped.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tickwise_scheduler::AdaptiveLoop;
///
/// let update_loop = AdaptiveLoop::new(
///     |handle: &AdaptiveLoop| {
///         if handle.invocations() >= 9 {
///             handle.stop();
///         }
///     },
///     Duration::from_millis(1),
/// )?;
///
/// let thread = update_loop.start()?;
/// thread.join().ok();
/// assert_eq!(update_loop.invocations(), 10);
/// # Ok::<(), tickwise_scheduler::LoopError>(())
/// ```
#[derive(Clone)]
pub struct AdaptiveLoop {
    shared: Arc<Shared>,
}

impl AdaptiveLoop {
    /// Create a loop invoking `callback` every `period`, with a window sized
    /// for about one second of history.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::PeriodOutOfRange`] if `period` does not fit in
    /// 64-bit nanoseconds.
    pub fn new<F>(callback: F, period: Duration) -> LoopResult<Self>
    where
        F: FnMut(&AdaptiveLoop) + Send + 'static,
    {
        Self::from_config(LoopConfig::with_period_ns(period_to_ns(period)?), callback)
    }

    /// Create a loop with an explicit history window capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero or `period` does not fit in
    /// 64-bit nanoseconds.
    pub fn with_capacity<F>(callback: F, period: Duration, capacity: usize) -> LoopResult<Self>
    where
        F: FnMut(&AdaptiveLoop) + Send + 'static,
    {
        let config = LoopConfig {
            window_capacity: Some(capacity),
            ..LoopConfig::with_period_ns(period_to_ns(period)?)
        };
        Self::from_config(config, callback)
    }

    /// Create a loop from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the window cannot
    /// be allocated.
    pub fn from_config<F>(config: LoopConfig, callback: F) -> LoopResult<Self>
    where
        F: FnMut(&AdaptiveLoop) + Send + 'static,
    {
        config.validate()?;
        let window = HistoryWindow::new(config.effective_capacity())?;

        debug!(
            period_ns = config.period_ns,
            capacity = window.capacity(),
            thread = %config.thread_name,
            "Adaptive loop created"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                window,
                period_ns: AtomicU64::new(config.period_ns),
                state: AtomicU8::new(LoopState::Created as u8),
                invocations: AtomicU64::new(0),
                callback: Mutex::new(Some(Box::new(callback))),
                wake: WakeSignal::new(),
                clock: MonotonicClock::new(),
                thread_name: config.thread_name,
            }),
        })
    }

    /// Start the loop on a new dedicated thread.
    ///
    /// Returns the thread's handle; joining it waits for the loop to exit
    /// after [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::AlreadyStarted`] or [`LoopError::Stopped`] if the
    /// loop is not in the `Created` state, and [`LoopError::SpawnFailed`] if
    /// the thread cannot be spawned. A failed spawn leaves the loop stopped
    /// since the callback went down with the thread closure.
    pub fn start(&self) -> LoopResult<JoinHandle<()>> {
        let callback = self.claim()?;
        let worker = self.clone();

        thread::Builder::new()
            .name(self.shared.thread_name.clone())
            .spawn(move || worker.drive(callback))
            .map_err(|err| {
                self.shared
                    .state
                    .store(LoopState::Stopped as u8, Ordering::Release);
                LoopError::spawn_failed(err.to_string())
            })
    }

    /// Run the loop on the calling thread until it is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::AlreadyStarted`] or [`LoopError::Stopped`] if the
    /// loop is not in the `Created` state.
    pub fn run(&self) -> LoopResult<()> {
        let callback = self.claim()?;
        self.drive(callback);
        Ok(())
    }

    /// Request the loop to stop.
    ///
    /// The callback runs at most once more. Idempotent and safe to call from
    /// any thread, including from inside the callback. Stopping a loop that
    /// was never started prevents it from starting and drops its callback.
    pub fn stop(&self) {
        let previous = self
            .shared
            .state
            .swap(LoopState::Stopped as u8, Ordering::AcqRel);

        if previous != LoopState::Stopped as u8 {
            debug!(
                previous = %LoopState::from_u8(previous),
                "Adaptive loop stop requested"
            );
            self.shared.wake.notify();
        }

        // Released outside the lock; the callback may own loop handles.
        let unclaimed = self.shared.callback.lock().take();
        drop(unclaimed);
    }

    /// Change the target period.
    ///
    /// History recorded under the old period is discarded first, so the next
    /// cycle runs immediately and the window rebuilds under the new cadence.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::PeriodOutOfRange`] if `period` does not fit in
    /// 64-bit nanoseconds; the loop is left unchanged.
    pub fn set_period(&self, period: Duration) -> LoopResult<()> {
        self.set_period_ns(period_to_ns(period)?);
        Ok(())
    }

    /// Change the target period, in nanoseconds.
    pub fn set_period_ns(&self, period_ns: u64) {
        self.shared.window.forget();
        let previous = self.shared.period_ns.swap(period_ns, Ordering::AcqRel);
        self.shared.wake.notify();

        debug!(
            previous_ns = previous,
            period_ns, "Adaptive loop period changed"
        );
    }

    /// Current target period in nanoseconds.
    #[inline]
    #[must_use]
    pub fn period_ns(&self) -> u64 {
        self.shared.period_ns.load(Ordering::Acquire)
    }

    /// Current target period.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_nanos(self.period_ns())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Whether the loop is running and has not been asked to stop.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    /// Total number of completed callback invocations.
    #[must_use]
    pub fn invocations(&self) -> u64 {
        self.shared.invocations.load(Ordering::Acquire)
    }

    /// Capacity of the history window.
    #[must_use]
    pub fn window_capacity(&self) -> usize {
        self.shared.window.capacity()
    }

    /// Move from `Created` to `Running` and take the callback.
    fn claim(&self) -> LoopResult<Callback> {
        let transition = self.shared.state.compare_exchange(
            LoopState::Created as u8,
            LoopState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        match transition.map_err(LoopState::from_u8) {
            Ok(_) => {}
            Err(LoopState::Stopped) => return Err(LoopError::Stopped),
            Err(_) => return Err(LoopError::AlreadyStarted),
        }

        self.shared
            .callback
            .lock()
            .take()
            .ok_or(LoopError::Stopped)
    }

    fn drive(&self, mut callback: Callback) {
        let _exit = ExitGuard(&self.shared);

        info!(
            period_ns = self.period_ns(),
            capacity = self.window_capacity(),
            "Adaptive loop running"
        );

        while self.is_running() {
            self.wait_for_deadline();

            self.shared.window.insert(self.shared.clock.now_ns());
            if !self.is_running() {
                break;
            }

            callback(self);
            self.shared.invocations.fetch_add(1, Ordering::AcqRel);
        }

        info!(invocations = self.invocations(), "Adaptive loop exited");
    }

    /// Sleep until the window says the next invocation is due.
    ///
    /// Early wake-ups recompute the deadline instead of returning, so they
    /// never shorten the period.
    fn wait_for_deadline(&self) {
        loop {
            let seen = self.shared.wake.generation();
            let sleep_ns = determine_sleep_time(
                &self.shared.window,
                self.shared.clock.now_ns(),
                self.period_ns(),
            );

            let Ok(sleep_ns) = u64::try_from(sleep_ns) else {
                return;
            };
            if sleep_ns == 0 || !self.is_running() {
                return;
            }

            trace!(sleep_ns, "Adaptive loop sleeping");
            if self.shared.wake.wait(seen, Duration::from_nanos(sleep_ns)) {
                trace!("Adaptive loop woken early, recomputing deadline");
            }
        }
    }
}

impl fmt::Debug for AdaptiveLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveLoop")
            .field("state", &self.state())
            .field("period_ns", &self.period_ns())
            .field("window_capacity", &self.window_capacity())
            .field("invocations", &self.invocations())
            .field("thread_name", &self.shared.thread_name)
            .finish()
    }
}

fn period_to_ns(period: Duration) -> LoopResult<u64> {
    u64::try_from(period.as_nanos()).or(Err(LoopError::PeriodOutOfRange(period)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn idle_loop() -> LoopResult<AdaptiveLoop> {
        AdaptiveLoop::new(|_: &AdaptiveLoop| {}, Duration::from_millis(10))
    }

    #[test]
    fn test_loop_creation() -> LoopResult<()> {
        let update_loop = idle_loop()?;
        assert_eq!(update_loop.state(), LoopState::Created);
        assert_eq!(update_loop.period_ns(), 10_000_000);
        assert_eq!(update_loop.window_capacity(), 100);
        assert_eq!(update_loop.invocations(), 0);
        assert!(!update_loop.is_running());
        Ok(())
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = AdaptiveLoop::with_capacity(|_: &AdaptiveLoop| {}, Duration::ZERO, 0);
        assert!(matches!(result, Err(LoopError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_out_of_range_period_rejected() {
        let result = AdaptiveLoop::new(|_: &AdaptiveLoop| {}, Duration::MAX);
        assert!(matches!(result, Err(LoopError::PeriodOutOfRange(_))));
    }

    #[test]
    fn test_set_period_rejects_out_of_range() -> LoopResult<()> {
        let update_loop = idle_loop()?;
        let result = update_loop.set_period(Duration::MAX);

        assert!(matches!(result, Err(LoopError::PeriodOutOfRange(_))));
        assert_eq!(update_loop.period_ns(), 10_000_000);
        Ok(())
    }

    #[test]
    fn test_set_period_forgets_history() -> LoopResult<()> {
        let update_loop = idle_loop()?;
        update_loop.shared.window.insert(5);
        update_loop.shared.window.insert(6);

        update_loop.set_period(Duration::from_millis(20))?;

        assert!(update_loop.shared.window.is_empty());
        assert_eq!(update_loop.period(), Duration::from_millis(20));
        Ok(())
    }

    #[test]
    fn test_stop_before_start_prevents_start() -> LoopResult<()> {
        let update_loop = idle_loop()?;
        update_loop.stop();

        assert_eq!(update_loop.state(), LoopState::Stopped);
        assert!(matches!(update_loop.start(), Err(LoopError::Stopped)));
        assert!(matches!(update_loop.run(), Err(LoopError::Stopped)));
        Ok(())
    }

    #[test]
    fn test_stop_releases_unstarted_callback() -> LoopResult<()> {
        let slot: Arc<Mutex<Option<AdaptiveLoop>>> = Arc::new(Mutex::new(None));
        let captured = Arc::clone(&slot);
        let update_loop = AdaptiveLoop::new(
            move |_: &AdaptiveLoop| {
                if let Some(handle) = captured.lock().as_ref() {
                    handle.stop();
                }
            },
            Duration::from_millis(10),
        )?;
        *slot.lock() = Some(update_loop.clone());
        drop(slot);
        let shared = Arc::downgrade(&update_loop.shared);

        update_loop.stop();
        drop(update_loop);

        assert!(shared.upgrade().is_none());
        Ok(())
    }

    #[test]
    fn test_early_wakes_keep_the_period() -> LoopResult<()> {
        let update_loop = AdaptiveLoop::new(|_: &AdaptiveLoop| {}, Duration::from_millis(100))?;
        let thread = update_loop.start()?;

        let begin = Instant::now();
        while begin.elapsed() < Duration::from_millis(250) {
            update_loop.shared.wake.notify();
            thread::sleep(Duration::from_micros(250));
        }
        let invocations = update_loop.invocations();

        update_loop.stop();
        thread.join().ok();

        assert_eq!(invocations, 3);
        Ok(())
    }

    #[test]
    fn test_run_on_current_thread() -> LoopResult<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let update_loop = AdaptiveLoop::new(
            move |handle: &AdaptiveLoop| {
                if counted.fetch_add(1, Ordering::Relaxed) + 1 == 3 {
                    handle.stop();
                }
            },
            Duration::from_micros(100),
        )?;

        update_loop.run()?;

        assert_eq!(calls.load(Ordering::Relaxed), 3);
        assert_eq!(update_loop.invocations(), 3);
        assert_eq!(update_loop.state(), LoopState::Stopped);
        Ok(())
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LoopState::Created.to_string(), "created");
        assert_eq!(LoopState::Running.to_string(), "running");
        assert_eq!(LoopState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn test_debug_output() -> LoopResult<()> {
        let rendered = format!("{:?}", idle_loop()?);
        assert!(rendered.contains("AdaptiveLoop"));
        assert!(rendered.contains("Created"));
        Ok(())
    }
}
