//! Lifecycle states and state sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FsmError, FsmResult};

/// Current phase of the pipeline lifecycle.
///
/// Exactly one value is current at any instant. The discriminants are the
/// raw values stored in [`crate::SharedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum State {
    /// Initial state; nothing flows.
    #[default]
    Idle = 0,
    /// Producer and Consumer move messages.
    Running = 1,
    /// Suspended; a Start or Stop may follow.
    Paused = 2,
    /// A fault was reported while running.
    Error = 3,
    /// Stopped; only Reset leaves this state.
    Finished = 4,
    /// Settling back to Idle.
    Reset = 5,
    /// Temporarily waiting on a Resume or Continue.
    Waiting = 6,
    /// Recovering from an error.
    Retry = 7,
}

impl State {
    /// Every state, in discriminant order.
    pub const ALL: [State; 8] = [
        State::Idle,
        State::Running,
        State::Paused,
        State::Error,
        State::Finished,
        State::Reset,
        State::Waiting,
        State::Retry,
    ];

    /// Convert from the raw discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::UnknownState`] if `raw` is not a discriminant.
    pub const fn from_raw(raw: u8) -> FsmResult<Self> {
        match raw {
            0 => Ok(Self::Idle),
            1 => Ok(Self::Running),
            2 => Ok(Self::Paused),
            3 => Ok(Self::Error),
            4 => Ok(Self::Finished),
            5 => Ok(Self::Reset),
            6 => Ok(Self::Waiting),
            7 => Ok(Self::Retry),
            other => Err(FsmError::UnknownState(other)),
        }
    }

    /// Convert to the raw discriminant.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Whether Producer and Consumer should move data in this state.
    #[must_use]
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Get the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Error => "Error",
            Self::Finished => "Finished",
            Self::Reset => "Reset",
            Self::Waiting => "Waiting",
            Self::Retry => "Retry",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = FsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FsmError::unknown_name(s))
    }
}

impl TryFrom<u8> for State {
    type Error = FsmError;

    fn try_from(raw: u8) -> Result<Self, FsmError> {
        Self::from_raw(raw)
    }
}

/// A set of states, stored as a bitmask.
///
/// Used for transition guards ("current state is one of ...") and for the
/// trigger sets of event sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateSet(u16);

impl StateSet {
    /// The empty set.
    pub const EMPTY: StateSet = StateSet(0);

    /// Every state.
    pub const ALL: StateSet = StateSet::of(&State::ALL);

    /// Build a set from a slice of states.
    #[must_use]
    pub const fn of(states: &[State]) -> Self {
        let mut bits = 0u16;
        let mut rest = states;
        while let [first, tail @ ..] = rest {
            bits |= 1 << first.to_raw();
            rest = tail;
        }
        Self(bits)
    }

    /// A set holding a single state.
    #[must_use]
    pub const fn single(state: State) -> Self {
        Self(1 << state.to_raw())
    }

    /// Whether `state` is a member.
    #[must_use]
    pub const fn contains(self, state: State) -> bool {
        self.0 & (1 << state.to_raw()) != 0
    }

    /// Return a copy with `state` added.
    #[must_use]
    pub const fn with(self, state: State) -> Self {
        Self(self.0 | (1 << state.to_raw()))
    }

    /// Whether the set has no members.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of members.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Whether two sets share a member.
    #[must_use]
    pub const fn intersects(self, other: StateSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterate over members in discriminant order.
    pub fn iter(self) -> impl Iterator<Item = State> {
        State::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, StateSet::with)
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, state) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(state.as_str())?;
        }
        f.write_str("}")
    }
}
