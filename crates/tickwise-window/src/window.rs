//! Ring buffer of recent timestamps with "oldest entry" lookup.
//!
//! The storage is allocated once at construction and never resized. Inserts
//! overwrite the logically oldest slot once the window is full, and
//! [`HistoryWindow::forget`] only resets the valid-entry count: stale values stay
//! in the backing slice but are unreadable until overwritten.

use parking_lot::Mutex;

use crate::entry::TimestampEntry;
use crate::error::{WindowError, WindowResult};

/// Unsynchronized ring state, guarded by the window's lock.
#[derive(Debug)]
struct Ring {
    values: Box<[u64]>,
    write_index: usize,
    len: usize,
}

impl Ring {
    fn insert(&mut self, value: u64) {
        let capacity = self.values.len();
        if let Some(slot) = self.values.get_mut(self.write_index) {
            *slot = value;
        }
        self.write_index = (self.write_index + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
    }

    fn oldest(&self) -> Option<TimestampEntry> {
        let capacity = self.values.len();
        let age = self.len.checked_sub(1)?;
        // write_index < capacity and len <= capacity, so this never underflows
        let index = (capacity + self.write_index - self.len) % capacity;
        self.values
            .get(index)
            .map(|&value| TimestampEntry::new(age, value))
    }
}

/// Fixed-capacity history of invocation timestamps.
///
/// # Invariants
///
/// - `len() <= capacity()` at all times
/// - the entry returned by [`oldest`](Self::oldest) has `age == len() - 1`
/// - `capacity()` never changes after construction
///
/// # Thread Safety
///
/// `insert`, `oldest`, and `forget` are mutually exclusive; each holds the lock
/// for a handful of instructions and never blocks while holding it.
#[derive(Debug)]
pub struct HistoryWindow {
    capacity: usize,
    ring: Mutex<Ring>,
}

impl HistoryWindow {
    /// Create an empty window able to track `capacity` timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ZeroCapacity`] when `capacity` is zero and
    /// [`WindowError::AllocationFailed`] when the backing storage cannot be
    /// reserved.
    pub fn new(capacity: usize) -> WindowResult<Self> {
        if capacity == 0 {
            return Err(WindowError::ZeroCapacity);
        }

        let mut values = Vec::new();
        if values.try_reserve_exact(capacity).is_err() {
            return Err(WindowError::AllocationFailed { capacity });
        }
        values.resize(capacity, 0);

        Ok(Self {
            capacity,
            ring: Mutex::new(Ring {
                values: values.into_boxed_slice(),
                write_index: 0,
                len: 0,
            }),
        })
    }

    /// Record a new timestamp, evicting the oldest one if the window is full.
    pub fn insert(&self, timestamp_ns: u64) {
        self.ring.lock().insert(timestamp_ns);
    }

    /// Earliest timestamp still inside the window, or `None` if it is empty.
    #[must_use]
    pub fn oldest(&self) -> Option<TimestampEntry> {
        self.ring.lock().oldest()
    }

    /// Discard all recorded history.
    ///
    /// Capacity is unchanged; the next insert starts a fresh window of age 0.
    pub fn forget(&self) {
        self.ring.lock().len = 0;
    }

    /// Maximum number of timestamps tracked at once.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of timestamps currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.lock().len
    }

    /// Whether no timestamps are currently tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
