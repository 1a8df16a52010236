//! Loop configuration.
//!
//! [`LoopConfig`] carries everything needed to build an
//! [`AdaptiveLoop`](crate::AdaptiveLoop) except the callback. It is
//! serializable so embedders can keep loop settings next to the rest of their
//! configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LoopError, LoopResult};
use crate::{MAX_DERIVED_CAPACITY, MIN_DERIVED_CAPACITY, NANOS_PER_SECOND, PERIOD_60HZ_NS};

/// Default name of the dedicated loop thread.
pub const DEFAULT_THREAD_NAME: &str = "tickwise-loop";

/// Window capacity spanning roughly one second of history at `period_ns`.
///
/// Returns `max(4, 1s / period)`, then caps it at [`MAX_DERIVED_CAPACITY`] so
/// periods shorter than about 239ns cannot allocate an unbounded window. A zero
/// period takes the floor value. An explicit capacity passed to the loop is
/// never capped.
#[must_use]
pub fn derive_capacity(period_ns: u64) -> usize {
    let per_second = NANOS_PER_SECOND.checked_div(period_ns).unwrap_or(0);
    let per_second = usize::try_from(per_second).unwrap_or(usize::MAX);
    per_second.clamp(MIN_DERIVED_CAPACITY, MAX_DERIVED_CAPACITY)
}

/// Configuration for an adaptive update loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Target interval between callback invocations, in nanoseconds.
    pub period_ns: u64,
    /// History window capacity; derived from the period when `None`.
    pub window_capacity: Option<usize>,
    /// Name given to the dedicated loop thread.
    pub thread_name: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            period_ns: PERIOD_60HZ_NS,
            window_capacity: None,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
        }
    }
}

impl LoopConfig {
    /// Create a configuration with the given period and defaults elsewhere.
    #[must_use]
    pub fn with_period_ns(period_ns: u64) -> Self {
        Self {
            period_ns,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the window capacity is zero or the thread name is
    /// unusable.
    pub fn validate(&self) -> LoopResult<()> {
        if self.window_capacity == Some(0) {
            return Err(LoopError::invalid_configuration(
                "window_capacity must be greater than 0",
            ));
        }
        if self.thread_name.is_empty() {
            return Err(LoopError::invalid_configuration(
                "thread_name must not be empty",
            ));
        }
        if self.thread_name.contains('\0') {
            return Err(LoopError::invalid_configuration(
                "thread_name must not contain NUL bytes",
            ));
        }
        Ok(())
    }

    /// Window capacity the loop will use: the explicit one, or one derived
    /// from the period.
    #[must_use]
    pub fn effective_capacity(&self) -> usize {
        self.window_capacity
            .unwrap_or_else(|| derive_capacity(self.period_ns))
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> LoopConfigBuilder {
        LoopConfigBuilder::default()
    }
}

/// Builder for `LoopConfig`.
#[derive(Debug, Default)]
pub struct LoopConfigBuilder {
    config: LoopConfig,
}

impl LoopConfigBuilder {
    /// Set the period in nanoseconds.
    #[must_use]
    pub fn period_ns(mut self, period_ns: u64) -> Self {
        self.config.period_ns = period_ns;
        self
    }

    /// Set an explicit window capacity.
    #[must_use]
    pub fn window_capacity(mut self, capacity: usize) -> Self {
        self.config.window_capacity = Some(capacity);
        self
    }

    /// Set the loop thread name.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> LoopResult<LoopConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
