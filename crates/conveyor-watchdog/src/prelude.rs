//! Prelude for conveyor-watchdog.
//!
//! This module re-exports the most commonly used types for convenient importing.

pub use crate::config::{WatchdogConfig, WatchdogConfigBuilder};
pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::metrics::{WatchdogMetrics, WatchdogMetricsSnapshot};
pub use crate::policy::{FireAction, on_fire};
pub use crate::timer::{WatchdogControl, WatchdogTimer};
