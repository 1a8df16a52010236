//! Next-wake computation from the history window.
//!
//! The next invocation is due `age + 1` periods after the oldest timestamp still
//! in the window, where `age` is the number of invocations recorded since that
//! timestamp. With a constant period every tracked timestamp points at the same
//! ideal cadence, so anchoring on the oldest one gives the longest averaging
//! horizon: a single late wake-up only moves the anchor once it has become the
//! oldest entry, and by then `age + 1` periods of real history absorb it.

use tickwise_window::{HistoryWindow, TimestampEntry};

/// Nanoseconds to sleep before the next invocation.
///
/// Returns 0 for an empty window. A result `<= 0` means the deadline has
/// arrived or passed and the caller should proceed without sleeping.
///
/// # Example
///
/// ```rust
/// use tickwise_scheduler::determine_sleep_time;
/// use tickwise_window::HistoryWindow;
///
/// const MS: u64 = 1_000_000;
/// let window = HistoryWindow::new(4)?;
/// assert_eq!(determine_sleep_time(&window, 1234, 10), 0);
///
/// window.insert(2_500 * MS);
/// assert_eq!(determine_sleep_time(&window, 2_503 * MS, 10 * MS), 7_000_000);
/// # Ok::<(), tickwise_window::WindowError>(())
/// ```
#[must_use]
pub fn determine_sleep_time(window: &HistoryWindow, current_ns: u64, period_ns: u64) -> i64 {
    match window.oldest() {
        Some(anchor) => sleep_time_from(anchor, current_ns, period_ns),
        None => 0,
    }
}

/// Nanoseconds from `current_ns` until `anchor.value + (anchor.age + 1) * period_ns`.
///
/// Computed in 128-bit arithmetic and saturated into `i64`.
#[must_use]
pub fn sleep_time_from(anchor: TimestampEntry, current_ns: u64, period_ns: u64) -> i64 {
    let periods = i128::try_from(anchor.age)
        .unwrap_or(i128::MAX)
        .saturating_add(1);
    let target_ns =
        i128::from(anchor.value).saturating_add(periods.saturating_mul(i128::from(period_ns)));
    let sleep_ns = target_ns.saturating_sub(i128::from(current_ns));

    i64::try_from(sleep_ns).unwrap_or(if sleep_ns.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}
