//! Error types for the scheduler crate.

use std::time::Duration;
use thiserror::Error;
use tickwise_window::WindowError;

/// Errors that can occur while building, reconfiguring, or starting a loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
    /// The history window could not be created.
    #[error("Invalid history window: {0}")]
    Window(#[from] WindowError),

    /// A period does not fit in 64-bit nanoseconds.
    #[error("Period {0:?} exceeds the nanosecond range")]
    PeriodOutOfRange(Duration),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `start` or `run` was called on a loop that is already running.
    #[error("Update loop has already started")]
    AlreadyStarted,

    /// `start` or `run` was called on a loop that has been stopped.
    #[error("Update loop has been stopped and cannot be restarted")]
    Stopped,

    /// The dedicated loop thread could not be spawned.
    #[error("Failed to spawn loop thread: {0}")]
    SpawnFailed(String),
}

impl LoopError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create a spawn failure error.
    #[must_use]
    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self::SpawnFailed(reason.into())
    }
}

/// A specialized `Result` type for loop operations.
pub type LoopResult<T = ()> = std::result::Result<T, LoopError>;
