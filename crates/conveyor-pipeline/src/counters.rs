//! Lock-free pipeline counters.
//!
//! # RT Safety
//!
//! Every `record_*` method is a single relaxed atomic increment: no
//! allocation, no blocking. Counters are diagnostics and never gate control
//! flow.

use conveyor_watchdog::WatchdogMetricsSnapshot;
use portable_atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};

use crate::pool::PoolStats;

/// Point-in-time copy of the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Events accepted by the event channel.
    pub events_submitted: u64,
    /// Events dropped because the event channel was full.
    pub events_dropped: u64,
    /// Events that matched a transition row.
    pub events_applied: u64,
    /// Events ignored in the state they arrived in.
    pub events_ignored: u64,
    /// Messages allocated and stamped by the producer.
    pub messages_produced: u64,
    /// Messages handed to the data channel.
    pub messages_enqueued: u64,
    /// Messages released because the data channel was full.
    pub messages_dropped_full: u64,
    /// Messages consumed and released by the consumer.
    pub messages_consumed: u64,
    /// Producer attempts that found the pool empty.
    pub allocation_failures: u64,
    /// Watchdog timer counters.
    pub watchdog: WatchdogMetricsSnapshot,
    /// Message pool accounting.
    pub pool: PoolStats,
}

/// Atomic pipeline counters shared by every worker.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    events_submitted: AtomicU64,
    events_dropped: AtomicU64,
    events_applied: AtomicU64,
    events_ignored: AtomicU64,
    messages_produced: AtomicU64,
    messages_enqueued: AtomicU64,
    messages_dropped_full: AtomicU64,
    messages_consumed: AtomicU64,
    allocation_failures: AtomicU64,
}

impl PipelineCounters {
    /// Create zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events_submitted: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
            events_applied: AtomicU64::new(0),
            events_ignored: AtomicU64::new(0),
            messages_produced: AtomicU64::new(0),
            messages_enqueued: AtomicU64::new(0),
            messages_dropped_full: AtomicU64::new(0),
            messages_consumed: AtomicU64::new(0),
            allocation_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_event_submitted(&self) {
        self.events_submitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_event_applied(&self) {
        self.events_applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_event_ignored(&self) {
        self.events_ignored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_message_produced(&self) {
        self.messages_produced.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_message_enqueued(&self) {
        self.messages_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_message_dropped_full(&self) {
        self.messages_dropped_full.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_message_consumed(&self) {
        self.messages_consumed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_allocation_failure(&self) {
        self.allocation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the pipeline counters. Watchdog and pool fields are left at
    /// their defaults; [`crate::Pipeline::counters`] fills them in.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            events_submitted: self.events_submitted.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            events_applied: self.events_applied.load(Ordering::Relaxed),
            events_ignored: self.events_ignored.load(Ordering::Relaxed),
            messages_produced: self.messages_produced.load(Ordering::Relaxed),
            messages_enqueued: self.messages_enqueued.load(Ordering::Relaxed),
            messages_dropped_full: self.messages_dropped_full.load(Ordering::Relaxed),
            messages_consumed: self.messages_consumed.load(Ordering::Relaxed),
            allocation_failures: self.allocation_failures.load(Ordering::Relaxed),
            watchdog: WatchdogMetricsSnapshot::default(),
            pool: PoolStats::default(),
        }
    }
}
