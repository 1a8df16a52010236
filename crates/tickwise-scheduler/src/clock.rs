//! Monotonic nanosecond timestamps.

use std::time::Instant;

/// Monotonic clock reporting nanoseconds since its creation.
///
/// Timestamps from one clock are comparable with each other only.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Nanoseconds elapsed since the clock was created.
    ///
    /// Saturates at `u64::MAX`, roughly 584 years of uptime.
    #[inline]
    #[must_use]
    pub fn now_ns(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
