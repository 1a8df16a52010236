//! Updates-per-period counter.
//!
//! [`UpdateCounter`] answers "how many updates happened during the last full
//! period?", typically used as an updates-per-second readout for a game or
//! simulation loop.
//!
//! # Usage
//!
//! - create one counter per loop
//! - call [`UpdateCounter::increment`] at the start of every update
//! - read [`UpdateCounter::value`] from any thread
//!
//! ```rust
//! use tickwise_counter::UpdateCounter;
//!
//! let counter = UpdateCounter::new(1_000)?;
//! counter.increment_at(5_000);
//! counter.increment_at(5_500);
//! assert_eq!(counter.value(), None);
//!
//! counter.increment_at(6_000);
//! assert_eq!(counter.value(), Some(2));
//! # Ok::<(), tickwise_counter::CounterError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]

pub mod counter;
pub mod error;

pub use counter::UpdateCounter;
pub use error::{CounterError, CounterResult};

/// One second in nanoseconds, the default counting period.
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;
