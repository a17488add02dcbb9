//! Message consumer.
//!
//! While Running the consumer blocks on the data channel, handles one
//! message under the payload lock and releases it. A message already
//! dequeued when the state flips away from Running is still consumed; the
//! channel, not the state check, provides backpressure.

use conveyor_fsm::SharedState;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::channel::DataReceiver;
use crate::counters::PipelineCounters;
use crate::pool::Message;
use crate::shutdown::ShutdownToken;

/// State-gated message consumer. Terminal sink of the data path.
#[derive(Debug)]
pub struct Consumer {
    state: Arc<SharedState>,
    data: DataReceiver,
    payload_lock: Arc<Mutex<()>>,
    counters: Arc<PipelineCounters>,
}

impl Consumer {
    /// Create a consumer sharing `payload_lock` with the producer.
    #[must_use]
    pub fn new(
        state: Arc<SharedState>,
        data: DataReceiver,
        payload_lock: Arc<Mutex<()>>,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            state,
            data,
            payload_lock,
            counters,
        }
    }

    /// Handle and release one message. Always succeeds.
    pub fn consume(&self, message: Message) {
        let _guard = self.payload_lock.lock();
        tracing::debug!(slot = message.slot(), tag = message.tag(), "Consuming");
        drop(message);
        self.counters.record_message_consumed();
    }

    /// Block for the next message and consume it.
    ///
    /// Returns `false` on shutdown.
    pub fn consume_next(&self, shutdown: &ShutdownToken) -> bool {
        match self.data.recv(shutdown) {
            Some(message) => {
                self.consume(message);
                true
            }
            None => false,
        }
    }

    /// Consume until shutdown, pausing `interval` after each message and
    /// waiting at most `idle` on the state signal while not running.
    pub fn run(self, interval: Duration, idle: Duration, shutdown: &ShutdownToken) {
        tracing::debug!("Consumer running");
        while !shutdown.is_shutdown() {
            if !self.state.load().is_runnable() {
                self.state.wait_until(
                    |state| state.is_runnable() || shutdown.is_shutdown(),
                    idle,
                );
                continue;
            }

            if !self.consume_next(shutdown) || !shutdown.sleep(interval) {
                break;
            }
        }
        tracing::debug!("Consumer stopped");
    }
}
