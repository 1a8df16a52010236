//! Error types for the update counter.

use thiserror::Error;

/// Errors raised while constructing an [`UpdateCounter`](crate::UpdateCounter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CounterError {
    /// The counting period was zero.
    #[error("Counter period must be positive")]
    ZeroPeriod,
}

/// A specialized `Result` type for counter operations.
pub type CounterResult<T> = std::result::Result<T, CounterError>;
