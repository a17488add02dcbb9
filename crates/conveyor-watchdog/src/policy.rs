//! Watchdog fire policy.

use conveyor_fsm::State;
use std::fmt;

/// What one watchdog expiry does to the pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireAction {
    /// Write `to` over `from`.
    Advance {
        /// State the expiry observed.
        from: State,
        /// State written.
        to: State,
        /// Whether the timer disarms after the write.
        disarm: bool,
    },
    /// Leave `state` alone and disarm the timer.
    Disarm {
        /// State the expiry observed.
        state: State,
    },
}

impl FireAction {
    /// The state to write, if any.
    #[must_use]
    pub const fn target(&self) -> Option<State> {
        match *self {
            Self::Advance { to, .. } => Some(to),
            Self::Disarm { .. } => None,
        }
    }

    /// Whether the timer disarms after this action.
    #[must_use]
    pub const fn disarms(&self) -> bool {
        match *self {
            Self::Advance { disarm, .. } => disarm,
            Self::Disarm { .. } => true,
        }
    }
}

impl fmt::Display for FireAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advance { from, to, disarm } => {
                write!(f, "{from} -> {to}")?;
                if *disarm {
                    f.write_str(" (disarm)")?;
                }
                Ok(())
            }
            Self::Disarm { state } => write!(f, "{state}: no change (disarm)"),
        }
    }
}

/// Decide what an expiry does in `state`.
///
/// Finished is terminal from the timer's point of view: reaching it from
/// Running disarms the timer, and firing while already there disarms too.
#[must_use]
pub const fn on_fire(state: State) -> FireAction {
    match state {
        State::Idle => FireAction::Advance {
            from: State::Idle,
            to: State::Running,
            disarm: false,
        },
        State::Running => FireAction::Advance {
            from: State::Running,
            to: State::Finished,
            disarm: true,
        },
        State::Paused
        | State::Error
        | State::Finished
        | State::Reset
        | State::Waiting
        | State::Retry => FireAction::Disarm { state },
    }
}
