//! Message producer.
//!
//! While the pipeline is Running the producer takes the payload lock, takes
//! a slot from the [`MessagePool`], stamps it with the uptime and offers it
//! to the data channel. A full channel hands the message back and it is
//! released on the spot, still under the lock. An empty pool is reported as an Error event and retried after a
//! short pause. Outside Running the producer waits on the state-change
//! signal instead of polling.

use conveyor_fsm::{Event, SharedState};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::channel::{DataSender, EventSender, SubmitOutcome};
use crate::counters::PipelineCounters;
use crate::pool::{Message, MessagePool};
use crate::shutdown::ShutdownToken;

/// Result of one production attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProduceOutcome {
    /// The message is in the data channel.
    Enqueued {
        /// Slot that was handed over.
        slot: usize,
    },
    /// The data channel was full; the message was released.
    DroppedFull {
        /// Slot that was released.
        slot: usize,
    },
    /// The pool was empty; an Error event was offered.
    AllocationFailed {
        /// Whether the Error event made it into the event channel.
        error_event_queued: bool,
    },
}

/// Pacing for [`Producer::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerTiming {
    /// Pause after every attempt.
    pub production: Duration,
    /// Pause after an allocation failure.
    pub allocation_retry: Duration,
    /// Longest wait on the state-change signal while not running.
    pub idle: Duration,
}

/// State-gated message producer.
#[derive(Debug)]
pub struct Producer {
    state: Arc<SharedState>,
    pool: MessagePool,
    data: DataSender,
    events: EventSender,
    payload_lock: Arc<Mutex<()>>,
    counters: Arc<PipelineCounters>,
    epoch: Instant,
}

impl Producer {
    /// Create a producer.
    ///
    /// `payload_lock` is shared with the consumer; the enqueue and the
    /// consumer's release run under it.
    #[must_use]
    pub fn new(
        state: Arc<SharedState>,
        pool: MessagePool,
        data: DataSender,
        events: EventSender,
        payload_lock: Arc<Mutex<()>>,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            state,
            pool,
            data,
            events,
            payload_lock,
            counters,
            epoch: Instant::now(),
        }
    }

    fn uptime_ms(&self) -> u32 {
        u32::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u32::MAX)
    }

    fn allocate_or_report(&self) -> Result<Message, SubmitOutcome> {
        let Some(mut message) = self.pool.allocate() else {
            self.counters.record_allocation_failure();
            tracing::warn!("Failed to allocate message, reporting error");
            return Err(self.events.submit(Event::Error));
        };
        message.stamp(self.uptime_ms());
        self.counters.record_message_produced();
        Ok(message)
    }

    /// Allocate and stamp one message under the payload lock.
    ///
    /// An empty pool is not surfaced as an error: an Error event is offered
    /// to the dispatcher (dropped if the event channel is full) and `None`
    /// is returned.
    pub fn produce(&self) -> Option<Message> {
        let _guard = self.payload_lock.lock();
        self.allocate_or_report().ok()
    }

    /// One production attempt, regardless of state.
    pub fn produce_once(&self) -> ProduceOutcome {
        let _guard = self.payload_lock.lock();
        let message = match self.allocate_or_report() {
            Ok(message) => message,
            Err(submitted) => {
                return ProduceOutcome::AllocationFailed {
                    error_event_queued: submitted.is_enqueued(),
                };
            }
        };

        let slot = message.slot();
        tracing::debug!(slot, tag = message.tag(), "Producing");
        match self.data.try_publish(message) {
            Ok(()) => {
                self.counters.record_message_enqueued();
                ProduceOutcome::Enqueued { slot }
            }
            Err(rejected) => {
                tracing::warn!(slot, "Data channel full, releasing message");
                drop(rejected);
                self.counters.record_message_dropped_full();
                ProduceOutcome::DroppedFull { slot }
            }
        }
    }

    /// Produce until shutdown.
    pub fn run(self, timing: ProducerTiming, shutdown: &ShutdownToken) {
        tracing::debug!("Producer running");
        while !shutdown.is_shutdown() {
            if !self.state.load().is_runnable() {
                self.state.wait_until(
                    |state| state.is_runnable() || shutdown.is_shutdown(),
                    timing.idle,
                );
                continue;
            }

            let pause = match self.produce_once() {
                ProduceOutcome::AllocationFailed { .. } => timing.allocation_retry,
                ProduceOutcome::Enqueued { .. } | ProduceOutcome::DroppedFull { .. } => {
                    timing.production
                }
            };
            if !shutdown.sleep(pause) {
                break;
            }
        }
        tracing::debug!("Producer stopped");
    }
}
