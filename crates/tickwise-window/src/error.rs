//! Error types for the history window.

use thiserror::Error;

/// Errors raised while constructing a [`HistoryWindow`](crate::HistoryWindow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    /// The requested capacity was zero.
    #[error("Window capacity must be positive")]
    ZeroCapacity,

    /// Storage for the requested capacity could not be allocated.
    #[error("Unable to allocate a window of {capacity} timestamps")]
    AllocationFailed {
        /// The capacity that was requested.
        capacity: usize,
    },
}

/// A specialized `Result` type for window operations.
pub type WindowResult<T> = std::result::Result<T, WindowError>;
