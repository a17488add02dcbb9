//! Watchdog counters.
//!
//! All increments use `Ordering::Relaxed`: the counters are diagnostics and
//! do not synchronize with the state cell.

use portable_atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};

/// Point-in-time copy of [`WatchdogMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WatchdogMetricsSnapshot {
    /// Expiries handled while armed.
    pub fires: u64,
    /// Expiries that wrote a new state.
    pub advances: u64,
    /// Times the timer was disarmed, by itself or by a Stop.
    pub disarms: u64,
    /// Times the timer was armed.
    pub arms: u64,
}

/// Lock-free watchdog counters.
#[derive(Debug, Default)]
pub struct WatchdogMetrics {
    fires: AtomicU64,
    advances: AtomicU64,
    disarms: AtomicU64,
    arms: AtomicU64,
}

impl WatchdogMetrics {
    /// Create zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fires: AtomicU64::new(0),
            advances: AtomicU64::new(0),
            disarms: AtomicU64::new(0),
            arms: AtomicU64::new(0),
        }
    }

    /// Record an expiry.
    #[inline]
    pub fn record_fire(&self) {
        self.fires.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a state write by the watchdog.
    #[inline]
    pub fn record_advance(&self) {
        self.advances.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an armed-to-disarmed change.
    #[inline]
    pub fn record_disarm(&self) {
        self.disarms.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a disarmed-to-armed change.
    #[inline]
    pub fn record_arm(&self) {
        self.arms.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    #[must_use]
    pub fn snapshot(&self) -> WatchdogMetricsSnapshot {
        WatchdogMetricsSnapshot {
            fires: self.fires.load(Ordering::Relaxed),
            advances: self.advances.load(Ordering::Relaxed),
            disarms: self.disarms.load(Ordering::Relaxed),
            arms: self.arms.load(Ordering::Relaxed),
        }
    }
}
