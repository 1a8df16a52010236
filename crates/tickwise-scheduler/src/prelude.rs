//! Prelude module for common scheduler types.
//!
//! ```rust
//! use tickwise_scheduler::prelude::*;
//!
//! let config = LoopConfig::builder().period_ns(PERIOD_60HZ_NS).build()?;
//! let update_loop = AdaptiveLoop::from_config(config, |_: &AdaptiveLoop| {})?;
//! assert_eq!(update_loop.state(), LoopState::Created);
//! # Ok::<(), LoopError>(())
//! ```

pub use crate::adaptive_loop::{AdaptiveLoop, LoopState};
pub use crate::config::{LoopConfig, LoopConfigBuilder};
pub use crate::error::{LoopError, LoopResult};
pub use crate::sleep_time::determine_sleep_time;
pub use crate::{HistoryWindow, PERIOD_60HZ_NS, TimestampEntry};
