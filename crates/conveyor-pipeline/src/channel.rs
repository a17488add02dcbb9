//! Bounded event and data channels.
//!
//! Both channels are crossbeam bounded queues. Enqueue never blocks on
//! either: a full event channel drops the event, a full data channel hands
//! the message back so the producer can release it. Only dequeue blocks,
//! and every blocking receive also wakes on shutdown.

use conveyor_fsm::Event;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::Arc;

use crate::counters::PipelineCounters;
use crate::pool::Message;
use crate::shutdown::ShutdownToken;

/// Result of a non-blocking event submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The event is queued for the dispatcher.
    Enqueued,
    /// The channel was full and the event was dropped.
    DroppedFull,
    /// The dispatcher side is gone.
    Disconnected,
}

impl SubmitOutcome {
    /// Whether the event was queued.
    #[must_use]
    pub const fn is_enqueued(self) -> bool {
        matches!(self, Self::Enqueued)
    }
}

/// Create an event channel of `capacity` slots.
#[must_use]
pub fn event_channel(
    capacity: usize,
    counters: Arc<PipelineCounters>,
) -> (EventSender, EventReceiver) {
    let (tx, rx) = channel::bounded(capacity);
    (EventSender { tx, counters }, EventReceiver { rx })
}

/// Cloneable submitting side of the event channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<Event>,
    counters: Arc<PipelineCounters>,
}

impl EventSender {
    /// Try to queue `event` without blocking.
    pub fn submit(&self, event: Event) -> SubmitOutcome {
        match self.tx.try_send(event) {
            Ok(()) => {
                self.counters.record_event_submitted();
                SubmitOutcome::Enqueued
            }
            Err(TrySendError::Full(event)) => {
                self.counters.record_event_dropped();
                tracing::warn!(%event, "Event channel full, dropping event");
                SubmitOutcome::DroppedFull
            }
            Err(TrySendError::Disconnected(event)) => {
                self.counters.record_event_dropped();
                tracing::debug!(%event, "Event channel closed, dropping event");
                SubmitOutcome::Disconnected
            }
        }
    }

    /// Queue `event`; `false` if it was dropped.
    pub fn submit_event(&self, event: Event) -> bool {
        self.submit(event).is_enqueued()
    }

    /// Events currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or_default()
    }
}

/// Dispatcher side of the event channel.
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<Event>,
}

impl EventReceiver {
    /// Block until an event arrives. `None` on shutdown or disconnect.
    pub fn recv(&self, shutdown: &ShutdownToken) -> Option<Event> {
        channel::select! {
            recv(self.rx) -> event => event.ok(),
            recv(shutdown.receiver()) -> _ => None,
        }
    }

    /// Take an event if one is queued.
    #[must_use]
    pub fn try_recv(&self) -> Option<Event> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Events currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Create a data channel of `capacity` slots.
#[must_use]
pub fn data_channel(capacity: usize) -> (DataSender, DataReceiver) {
    let (tx, rx) = channel::bounded(capacity);
    (DataSender { tx }, DataReceiver { rx })
}

/// Producer side of the data channel.
#[derive(Debug)]
pub struct DataSender {
    tx: Sender<Message>,
}

impl DataSender {
    /// Try to queue `message` without blocking.
    ///
    /// # Errors
    ///
    /// Returns the message back when the channel is full or closed; the
    /// caller still owns it and must release it.
    pub fn try_publish(&self, message: Message) -> Result<(), Message> {
        self.tx.try_send(message).map_err(TrySendError::into_inner)
    }

    /// Messages currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether no messages are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or_default()
    }
}

/// Consumer side of the data channel.
#[derive(Debug)]
pub struct DataReceiver {
    rx: Receiver<Message>,
}

impl DataReceiver {
    /// Block until a message arrives. `None` on shutdown or disconnect.
    pub fn recv(&self, shutdown: &ShutdownToken) -> Option<Message> {
        channel::select! {
            recv(self.rx) -> message => message.ok(),
            recv(shutdown.receiver()) -> _ => None,
        }
    }

    /// Take a message if one is queued.
    #[must_use]
    pub fn try_recv(&self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Messages currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no messages are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
