//! Periodic event sources.
//!
//! An event source sleeps for its period, looks at the current state and,
//! if the state is one of its triggers, submits its event. Sources never
//! write the state themselves; everything goes through the event channel
//! and is subject to drop-on-full.

use conveyor_fsm::{Event, SharedState, State, StateSet};
use std::time::Duration;

use crate::channel::{EventSender, SubmitOutcome};
use crate::config::EventSourceConfig;
use crate::shutdown::ShutdownToken;

/// Something that periodically decides whether to request a transition.
pub trait EventProducer: Send {
    /// Name used for the thread and in logs.
    fn name(&self) -> &str;

    /// Sleep between observations.
    fn period(&self) -> Duration;

    /// Event to submit in `state`, if any.
    fn poll(&mut self, state: State) -> Option<Event>;
}

impl<P: EventProducer + ?Sized> EventProducer for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn period(&self) -> Duration {
        (**self).period()
    }

    fn poll(&mut self, state: State) -> Option<Event> {
        (**self).poll(state)
    }
}

/// Fixed-event source triggered by a set of states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSource {
    name: String,
    event: Event,
    triggers: StateSet,
    period: Duration,
}

impl EventSource {
    /// Create a source.
    pub fn new(name: impl Into<String>, event: Event, triggers: StateSet, period: Duration) -> Self {
        Self {
            name: name.into(),
            event,
            triggers,
            period,
        }
    }

    /// Build a source from configuration, scaling the period by `time_unit`.
    #[must_use]
    pub fn from_config(config: &EventSourceConfig, time_unit: Duration) -> Self {
        Self::new(
            config.name.clone(),
            config.event,
            config.trigger_set(),
            time_unit.saturating_mul(config.period),
        )
    }

    /// Event this source submits.
    #[must_use]
    pub fn event(&self) -> Event {
        self.event
    }

    /// Trigger states.
    #[must_use]
    pub fn triggers(&self) -> StateSet {
        self.triggers
    }
}

impl EventProducer for EventSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn poll(&mut self, state: State) -> Option<Event> {
        self.triggers.contains(state).then_some(self.event)
    }
}

/// Observe the state once and submit whatever `producer` asks for.
///
/// Returns `None` when the producer had nothing to submit.
pub fn tick<P>(producer: &mut P, state: &SharedState, events: &EventSender) -> Option<SubmitOutcome>
where
    P: EventProducer + ?Sized,
{
    let observed = state.load();
    let event = producer.poll(observed)?;
    let outcome = events.submit(event);
    tracing::debug!(
        source = producer.name(),
        state = %observed,
        %event,
        ?outcome,
        "Source submitted event"
    );
    Some(outcome)
}

/// Drive `producer` until shutdown: sleep one period, then [`tick`].
pub fn run_source<P>(
    mut producer: P,
    state: &SharedState,
    events: &EventSender,
    shutdown: &ShutdownToken,
) where
    P: EventProducer,
{
    tracing::debug!(source = producer.name(), "Event source running");
    while shutdown.sleep(producer.period()) {
        tick(&mut producer, state, events);
    }
    tracing::debug!(source = producer.name(), "Event source stopped");
}
