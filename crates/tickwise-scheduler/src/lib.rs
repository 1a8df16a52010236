//! Self-correcting periodic update loop.
//!
//! This crate runs a callback at a stable long-run rate on a dedicated thread,
//! for simulation and game loops where "about N times per second, averaged over
//! a short history" matters more than hitting every single tick. It includes:
//!
//! - **AdaptiveLoop**: the loop itself, with runtime period changes and
//!   idempotent stop
//! - **determine_sleep_time**: the pure next-wake computation, usable on its own
//! - **LoopConfig**: serializable loop settings with a validating builder
//! - **MonotonicClock**: nanosecond timestamps relative to loop creation
//!
//! # How it corrects itself
//!
//! The loop keeps the wake-up timestamps of its recent invocations in a
//! fixed-capacity [`HistoryWindow`]. The next invocation is due `age + 1`
//! periods after the oldest tracked timestamp. A late wake-up is therefore
//! compensated by shorter sleeps afterwards instead of shifting every later
//! deadline, and a spike in callback time is caught up on without an unbounded
//! burst: once the spike leaves the window it stops influencing the schedule.
//!
//! # Guarantees
//!
//! - **No hard real-time bound**: worst-case jitter follows the OS sleep
//! - **Bounded memory**: the window is allocated once at construction
//! - **Prompt reconfiguration**: `set_period` and `stop` wake a sleeping loop
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tickwise_scheduler::AdaptiveLoop;
//!
//! let update_loop = AdaptiveLoop::new(
//!     |_: &AdaptiveLoop| {
//!         // Advance the simulation by one step here
//!     },
//!     Duration::from_nanos(tickwise_scheduler::PERIOD_60HZ_NS),
//! )?;
//!
//! let thread = update_loop.start()?;
//! std::thread::sleep(Duration::from_secs(1));
//! update_loop.stop();
//! thread.join().ok();
//! # Ok::<(), tickwise_scheduler::LoopError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(unused_must_use)]
#![deny(missing_debug_implementations)]

pub mod adaptive_loop;
pub mod clock;
pub mod config;
pub mod error;
pub mod sleep_time;

mod wake;

pub mod prelude;

pub use adaptive_loop::{AdaptiveLoop, LoopState};
pub use clock::MonotonicClock;
pub use config::{LoopConfig, LoopConfigBuilder, derive_capacity};
pub use error::{LoopError, LoopResult};
pub use sleep_time::{determine_sleep_time, sleep_time_from};
pub use tickwise_window::{HistoryWindow, TimestampEntry};

/// One second in nanoseconds.
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Target period for 60Hz operation in nanoseconds.
pub const PERIOD_60HZ_NS: u64 = 16_666_667;

/// Smallest window capacity derived from a period.
pub const MIN_DERIVED_CAPACITY: usize = 4;

/// Largest window capacity derived from a period (32 MiB of timestamps).
pub const MAX_DERIVED_CAPACITY: usize = 1 << 22;
