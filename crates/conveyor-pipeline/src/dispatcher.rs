//! Event dispatcher.
//!
//! The dispatcher is the only consumer of the event channel and the only
//! event-driven writer of [`SharedState`]. It takes one event at a time, in
//! FIFO order, applies it through the [`TransitionTable`] and then runs the
//! row's [`Effect`]:
//!
//! - `StopWatchdog` disarms the watchdog through its shared control.
//! - `Settle { then }` holds the new state for the reset-settle window and
//!   then stores `then` unconditionally. The dispatcher takes no events
//!   during the window; they wait in the channel.

use conveyor_fsm::{Effect, Event, Outcome, SharedState, TransitionTable};
use conveyor_watchdog::WatchdogControl;
use std::sync::Arc;
use std::time::Duration;

use crate::channel::EventReceiver;
use crate::counters::PipelineCounters;
use crate::shutdown::ShutdownToken;

/// Serial event-to-state applier.
#[derive(Debug)]
pub struct Dispatcher {
    table: TransitionTable,
    state: Arc<SharedState>,
    events: EventReceiver,
    watchdog: Option<WatchdogControl>,
    reset_settle: Duration,
    counters: Arc<PipelineCounters>,
}

impl Dispatcher {
    /// Create a dispatcher over `events` writing into `state`.
    #[must_use]
    pub fn new(
        table: TransitionTable,
        state: Arc<SharedState>,
        events: EventReceiver,
        reset_settle: Duration,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            table,
            state,
            events,
            watchdog: None,
            reset_settle,
            counters,
        }
    }

    /// Attach the watchdog control disarmed by `StopWatchdog` effects.
    #[must_use]
    pub fn with_watchdog(mut self, watchdog: WatchdogControl) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    /// Apply one event and run its effect.
    ///
    /// Returns the table outcome. For a settle row the state has already
    /// moved on to the settle target when this returns.
    pub fn process(&self, event: Event, shutdown: &ShutdownToken) -> Outcome {
        let outcome = self.table.apply_to(&self.state, event);

        match outcome {
            Outcome::Applied {
                from,
                event,
                to,
                effect,
            } => {
                self.counters.record_event_applied();
                tracing::info!(%from, %event, %to, path = "dispatcher", "State changed");
                self.run_effect(effect, shutdown);
            }
            Outcome::Ignored { state, event } => {
                self.counters.record_event_ignored();
                tracing::debug!(%state, %event, "Event ignored");
            }
        }
        outcome
    }

    fn run_effect(&self, effect: Effect, shutdown: &ShutdownToken) {
        match effect {
            Effect::None => {}
            Effect::StopWatchdog => {
                if let Some(watchdog) = &self.watchdog
                    && watchdog.disarm()
                {
                    tracing::info!("Watchdog stopped");
                }
            }
            Effect::Settle { then } => {
                // An interrupted window still ends in `then`.
                shutdown.sleep(self.reset_settle);
                let from = self.state.store(then);
                tracing::info!(%from, to = %then, path = "dispatcher", "State changed");
            }
        }
    }

    /// Block for the next event and process it.
    ///
    /// Returns `None` on shutdown.
    pub fn run_once(&self, shutdown: &ShutdownToken) -> Option<Outcome> {
        tracing::trace!("Waiting for event");
        let event = self.events.recv(shutdown)?;
        Some(self.process(event, shutdown))
    }

    /// Dispatch until shutdown.
    pub fn run(self, shutdown: &ShutdownToken) {
        tracing::debug!("Dispatcher running");
        while self.run_once(shutdown).is_some() {}
        tracing::debug!("Dispatcher stopped");
    }
}
