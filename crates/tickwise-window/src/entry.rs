//! Snapshot of a single tracked timestamp.

use core::fmt;

/// A timestamp still tracked by a [`HistoryWindow`](crate::HistoryWindow),
/// paired with its age.
///
/// `age` 0 is the most recently inserted entry; larger ages are older.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimestampEntry {
    /// Number of inserts that happened after this one.
    pub age: usize,
    /// Monotonic timestamp in nanoseconds.
    pub value: u64,
}

impl TimestampEntry {
    /// Create a new entry.
    #[must_use]
    pub const fn new(age: usize, value: u64) -> Self {
        Self { age, value }
    }
}

impl fmt::Display for TimestampEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(age={},value={})", self.age, self.value)
    }
}
