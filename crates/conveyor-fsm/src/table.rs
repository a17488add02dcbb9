//! Declarative transition table.
//!
//! The lifecycle policy is data: a list of [`Transition`] rows, each saying
//! "from any state in `from`, on `event`, go to `to` and perform `effect`".
//! One generic function, [`TransitionTable::apply`], consults the rows.
//! Pairs without a row are [`Outcome::Ignored`].

use std::fmt;

use crate::error::{FsmError, FsmResult};
use crate::shared::SharedState;
use crate::{Event, State, StateSet};

/// Side effect attached to a transition row.
///
/// Effects are carried out by the dispatcher after the state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    /// Nothing beyond the state write.
    #[default]
    None,
    /// Disarm the watchdog timer.
    StopWatchdog,
    /// Hold the target state for the reset-settle window, then advance to
    /// `then` unconditionally. No other event is processed meanwhile.
    Settle {
        /// State entered once the window closes.
        then: State,
    },
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Guard: the current state must be a member.
    pub from: StateSet,
    /// Event this row reacts to.
    pub event: Event,
    /// State written when the guard holds.
    pub to: State,
    /// Follow-up work for the dispatcher.
    pub effect: Effect,
}

impl Transition {
    /// Create a row without a side effect.
    #[must_use]
    pub const fn new(from: StateSet, event: Event, to: State) -> Self {
        Self {
            from,
            event,
            to,
            effect: Effect::None,
        }
    }

    /// Attach a side effect to the row.
    #[must_use]
    pub const fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    /// Whether this row applies to `(state, event)`.
    #[must_use]
    pub const fn matches(&self, state: State, event: Event) -> bool {
        self.event.to_raw() == event.to_raw() && self.from.contains(state)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --{}--> {}", self.from, self.event, self.to)?;
        match self.effect {
            Effect::None => Ok(()),
            Effect::StopWatchdog => f.write_str(" [stop watchdog]"),
            Effect::Settle { then } => write!(f, " [settle, then {then}]"),
        }
    }
}

/// The pipeline's standard lifecycle rows.
pub const STANDARD_TRANSITIONS: [Transition; 10] = [
    Transition::new(
        StateSet::of(&[State::Idle, State::Paused]),
        Event::Start,
        State::Running,
    ),
    Transition::new(
        StateSet::of(&[State::Running, State::Paused]),
        Event::Stop,
        State::Finished,
    )
    .with_effect(Effect::StopWatchdog),
    Transition::new(StateSet::single(State::Running), Event::Pause, State::Waiting),
    Transition::new(StateSet::single(State::Waiting), Event::Resume, State::Running),
    Transition::new(StateSet::single(State::Running), Event::Error, State::Error),
    Transition::new(StateSet::single(State::Error), Event::Recover, State::Retry),
    Transition::new(StateSet::single(State::Finished), Event::Reset, State::Reset)
        .with_effect(Effect::Settle { then: State::Idle }),
    Transition::new(StateSet::single(State::Running), Event::Wait, State::Waiting),
    Transition::new(StateSet::single(State::Waiting), Event::Continue, State::Running),
    Transition::new(StateSet::single(State::Error), Event::Retry, State::Retry),
];

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A row matched and the state was written.
    Applied {
        /// State the event was applied to.
        from: State,
        /// Event that was applied.
        event: Event,
        /// State written.
        to: State,
        /// Work the dispatcher still owes.
        effect: Effect,
    },
    /// No row matched; the state is unchanged.
    Ignored {
        /// State the event was evaluated against.
        state: State,
        /// Event that was dropped.
        event: Event,
    },
}

impl Outcome {
    /// Whether the event was dropped.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    /// The state in force right after the event was evaluated.
    #[must_use]
    pub const fn next_state(&self) -> State {
        match *self {
            Self::Applied { to, .. } => to,
            Self::Ignored { state, .. } => state,
        }
    }

    /// The event that produced this outcome.
    #[must_use]
    pub const fn event(&self) -> Event {
        match *self {
            Self::Applied { event, .. } | Self::Ignored { event, .. } => event,
        }
    }
}

/// An ordered, unambiguous set of transition rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    rows: Vec<Transition>,
}

impl TransitionTable {
    /// The standard lifecycle table.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rows: STANDARD_TRANSITIONS.to_vec(),
        }
    }

    /// Build a table from custom rows.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::AmbiguousTransition`] if two rows match the same
    /// `(state, event)` pair, which would make dispatch order-dependent.
    pub fn new(rows: Vec<Transition>) -> FsmResult<Self> {
        for (i, row) in rows.iter().enumerate() {
            for other in rows.iter().skip(i.saturating_add(1)) {
                if row.event == other.event && row.from.intersects(other.from) {
                    let state = row
                        .from
                        .iter()
                        .find(|s| other.from.contains(*s))
                        .unwrap_or_default();
                    return Err(FsmError::AmbiguousTransition {
                        state,
                        event: row.event,
                    });
                }
            }
        }
        Ok(Self { rows })
    }

    /// All rows, in declaration order.
    #[must_use]
    pub fn rows(&self) -> &[Transition] {
        &self.rows
    }

    /// Find the row for `(state, event)`.
    #[must_use]
    pub fn lookup(&self, state: State, event: Event) -> Option<&Transition> {
        self.rows.iter().find(|row| row.matches(state, event))
    }

    /// Evaluate `event` against `state` without touching any shared cell.
    #[must_use]
    pub fn apply(&self, state: State, event: Event) -> Outcome {
        match self.lookup(state, event) {
            Some(row) => Outcome::Applied {
                from: state,
                event,
                to: row.to,
                effect: row.effect,
            },
            None => Outcome::Ignored { state, event },
        }
    }

    /// Evaluate `event` against `shared` and write the result atomically.
    ///
    /// If a concurrent writer changes the state mid-decision, the event is
    /// re-evaluated against the new state. Effects are returned, not run.
    pub fn apply_to(&self, shared: &SharedState, event: Event) -> Outcome {
        let mut observed = shared.load();
        let written = shared.transition_with(|current| {
            observed = current;
            self.lookup(current, event).map(|row| row.to)
        });

        match written {
            Some((from, to)) => Outcome::Applied {
                from,
                event,
                to,
                effect: self
                    .lookup(from, event)
                    .map_or(Effect::None, |row| row.effect),
            },
            None => Outcome::Ignored {
                state: observed,
                event,
            },
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Evaluate `event` against `state` using the standard table.
#[must_use]
pub fn apply(state: State, event: Event) -> Outcome {
    STANDARD_TRANSITIONS
        .iter()
        .find(|row| row.matches(state, event))
        .map_or(Outcome::Ignored { state, event }, |row| Outcome::Applied {
            from: state,
            event,
            to: row.to,
            effect: row.effect,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_unambiguous() -> FsmResult<()> {
        let table = TransitionTable::new(STANDARD_TRANSITIONS.to_vec())?;
        assert_eq!(table.rows().len(), 10);
        Ok(())
    }

    #[test]
    fn test_ambiguous_rows_rejected() {
        let rows = vec![
            Transition::new(StateSet::single(State::Idle), Event::Start, State::Running),
            Transition::new(
                StateSet::of(&[State::Idle, State::Error]),
                Event::Start,
                State::Retry,
            ),
        ];
        assert_eq!(
            TransitionTable::new(rows),
            Err(FsmError::AmbiguousTransition {
                state: State::Idle,
                event: Event::Start,
            })
        );
    }

    #[test]
    fn test_stop_carries_watchdog_effect() {
        let outcome = apply(State::Paused, Event::Stop);
        assert_eq!(
            outcome,
            Outcome::Applied {
                from: State::Paused,
                event: Event::Stop,
                to: State::Finished,
                effect: Effect::StopWatchdog,
            }
        );
    }

    #[test]
    fn test_reset_carries_settle_effect() {
        let outcome = apply(State::Finished, Event::Reset);
        assert!(matches!(
            outcome,
            Outcome::Applied {
                to: State::Reset,
                effect: Effect::Settle { then: State::Idle },
                ..
            }
        ));
    }

    #[test]
    fn test_unlisted_pair_is_ignored() {
        let outcome = apply(State::Finished, Event::Start);
        assert_eq!(
            outcome,
            Outcome::Ignored {
                state: State::Finished,
                event: Event::Start,
            }
        );
        assert_eq!(outcome.next_state(), State::Finished);
    }

    #[test]
    fn test_apply_to_writes_shared_state() {
        let table = TransitionTable::standard();
        let shared = SharedState::new(State::Running);

        let outcome = table.apply_to(&shared, Event::Wait);
        assert_eq!(outcome.next_state(), State::Waiting);
        assert_eq!(shared.load(), State::Waiting);

        let outcome = table.apply_to(&shared, Event::Error);
        assert!(outcome.is_ignored());
        assert_eq!(shared.load(), State::Waiting);
        assert_eq!(shared.write_count(), 1);
    }

    #[test]
    fn test_display_row() {
        let row = STANDARD_TRANSITIONS[1];
        assert_eq!(
            row.to_string(),
            "{Running, Paused} --Stop--> Finished [stop watchdog]"
        );
    }
}
