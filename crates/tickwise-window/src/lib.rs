//! Fixed-capacity history of invocation timestamps.
//!
//! A [`HistoryWindow`] remembers the most recent `capacity` timestamps inserted
//! into it and reports the *oldest* one still tracked together with its age.
//! Adaptive update loops anchor their next wake time on that entry: a timestamp
//! recorded `age` invocations ago plus `age + 1` periods.
//!
//! # Thread Safety
//!
//! Every operation takes `&self` and is serialized by a single internal lock, so
//! a loop thread may keep inserting while another thread calls
//! [`HistoryWindow::forget`].
//!
//! # Example
//!
//! ```rust
//! use tickwise_window::{HistoryWindow, TimestampEntry};
//!
//! let window = HistoryWindow::new(2)?;
//! assert!(window.oldest().is_none());
//!
//! window.insert(3);
//! window.insert(2);
//! window.insert(5);
//! assert_eq!(window.oldest(), Some(TimestampEntry::new(1, 2)));
//!
//! window.forget();
//! assert!(window.oldest().is_none());
//! # Ok::<(), tickwise_window::WindowError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod entry;
pub mod error;
pub mod window;

pub use entry::TimestampEntry;
pub use error::{WindowError, WindowResult};
pub use window::HistoryWindow;
