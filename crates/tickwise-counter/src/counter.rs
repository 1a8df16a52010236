//! Accumulate-and-swap update counter.
//!
//! Increments accumulate into a pending count. Once a full period has passed
//! since the reference time, the pending count is published and a new period
//! starts at the current time.
//!
//! # Thread Safety
//!
//! [`UpdateCounter::value`] is a single atomic load and may be called from any
//! thread, concurrently with increments. Increments are serialized by a short
//! lock; they are meant to come from the loop thread only, since increments
//! racing from several threads make "the last period" ill-defined.

use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;
use std::time::Instant;

use crate::NANOS_PER_SECOND;
use crate::error::{CounterError, CounterResult};

/// Published value meaning "no full period has completed yet".
const NO_VALUE: u64 = u64::MAX;

#[derive(Debug, Default)]
struct Period {
    reference_ns: Option<u64>,
    pending: u64,
}

/// Counts updates per fixed period.
#[derive(Debug)]
pub struct UpdateCounter {
    period_ns: u64,
    epoch: Instant,
    period: Mutex<Period>,
    value: AtomicU64,
}

impl Default for UpdateCounter {
    fn default() -> Self {
        Self::per_second()
    }
}

impl UpdateCounter {
    /// Create a counter reporting the number of updates per `period_ns`
    /// nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::ZeroPeriod`] when `period_ns` is zero.
    pub fn new(period_ns: u64) -> CounterResult<Self> {
        if period_ns == 0 {
            return Err(CounterError::ZeroPeriod);
        }
        Ok(Self::with_period_unchecked(period_ns))
    }

    /// Create a counter reporting updates per second.
    #[must_use]
    pub fn per_second() -> Self {
        Self::with_period_unchecked(NANOS_PER_SECOND)
    }

    fn with_period_unchecked(period_ns: u64) -> Self {
        Self {
            period_ns,
            epoch: Instant::now(),
            period: Mutex::new(Period::default()),
            value: AtomicU64::new(NO_VALUE),
        }
    }

    /// Record an update happening now.
    pub fn increment(&self) {
        let now_ns = u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.increment_at(now_ns);
    }

    /// Record an update happening at `now_ns`, a monotonic timestamp in
    /// nanoseconds.
    ///
    /// The first call only establishes the reference time.
    pub fn increment_at(&self, now_ns: u64) {
        let mut period = self.period.lock();
        let reference_ns = *period.reference_ns.get_or_insert(now_ns);

        if now_ns.saturating_sub(reference_ns) >= self.period_ns {
            self.value.store(period.pending, Ordering::Release);
            period.pending = 0;
            period.reference_ns = Some(now_ns);
        }

        period.pending = period.pending.saturating_add(1);
    }

    /// Number of updates during the last full period, or `None` if no full
    /// period has completed yet.
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        match self.value.load(Ordering::Acquire) {
            NO_VALUE => None,
            value => Some(value),
        }
    }

    /// Counting period in nanoseconds.
    #[inline]
    #[must_use]
    pub fn period_ns(&self) -> u64 {
        self.period_ns
    }
}
