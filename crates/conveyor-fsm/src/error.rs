//! Error types for state machine conversions and table construction.

use thiserror::Error;

use crate::{Event, State};

/// Errors produced by `conveyor-fsm`.
///
/// Applying an event is never an error: unmatched pairs are reported as
/// [`crate::Outcome::Ignored`]. These errors only cover decoding and
/// building a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    /// Raw value does not name a [`State`].
    #[error("Unknown state discriminant: {0}")]
    UnknownState(u8),

    /// Raw value does not name an [`Event`].
    #[error("Unknown event discriminant: {0}")]
    UnknownEvent(u8),

    /// Text does not name a state or event.
    #[error("Unknown name: '{0}'")]
    UnknownName(String),

    /// Two rows of a transition table match the same `(state, event)` pair.
    #[error("Ambiguous transition table: {state} has more than one row for {event}")]
    AmbiguousTransition {
        /// State matched by more than one row.
        state: State,
        /// Event shared by the conflicting rows.
        event: Event,
    },
}

impl FsmError {
    /// Create an unknown name error.
    #[must_use]
    pub fn unknown_name(name: impl Into<String>) -> Self {
        Self::UnknownName(name.into())
    }
}

/// A specialized `Result` type for state machine operations.
pub type FsmResult<T> = std::result::Result<T, FsmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FsmError::UnknownState(42);
        assert!(err.to_string().contains("42"));

        let err = FsmError::AmbiguousTransition {
            state: State::Running,
            event: Event::Pause,
        };
        assert!(err.to_string().contains("Running"));
        assert!(err.to_string().contains("Pause"));
    }

    #[test]
    fn test_unknown_name_constructor() {
        let err = FsmError::unknown_name("Exploded");
        assert!(matches!(err, FsmError::UnknownName(ref n) if n == "Exploded"));
    }
}
