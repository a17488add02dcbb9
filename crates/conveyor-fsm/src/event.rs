//! Transition request events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FsmError, FsmResult};

/// A request to transition the pipeline state.
///
/// Events carry no payload. Each one is consumed exactly once by the
/// dispatcher and then discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Event {
    /// Begin or restart data flow.
    Start = 0,
    /// Stop the pipeline for good.
    Stop = 1,
    /// Pause data flow.
    Pause = 2,
    /// Resume after a pause.
    Resume = 3,
    /// Report a fault.
    Error = 4,
    /// Begin recovering from a fault.
    Recover = 5,
    /// Return a finished pipeline to idle.
    Reset = 6,
    /// Wait on an external condition.
    Wait = 7,
    /// Continue after a wait.
    Continue = 8,
    /// Retry after a fault.
    Retry = 9,
}

impl Event {
    /// Every event, in discriminant order.
    pub const ALL: [Event; 10] = [
        Event::Start,
        Event::Stop,
        Event::Pause,
        Event::Resume,
        Event::Error,
        Event::Recover,
        Event::Reset,
        Event::Wait,
        Event::Continue,
        Event::Retry,
    ];

    /// Convert from the raw discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::UnknownEvent`] if `raw` is not a discriminant.
    pub const fn from_raw(raw: u8) -> FsmResult<Self> {
        match raw {
            0 => Ok(Self::Start),
            1 => Ok(Self::Stop),
            2 => Ok(Self::Pause),
            3 => Ok(Self::Resume),
            4 => Ok(Self::Error),
            5 => Ok(Self::Recover),
            6 => Ok(Self::Reset),
            7 => Ok(Self::Wait),
            8 => Ok(Self::Continue),
            9 => Ok(Self::Retry),
            other => Err(FsmError::UnknownEvent(other)),
        }
    }

    /// Convert to the raw discriminant.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Get the event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::Error => "Error",
            Self::Recover => "Recover",
            Self::Reset => "Reset",
            Self::Wait => "Wait",
            Self::Continue => "Continue",
            Self::Retry => "Retry",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Event {
    type Err = FsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FsmError::unknown_name(s))
    }
}

impl TryFrom<u8> for Event {
    type Error = FsmError;

    fn try_from(raw: u8) -> Result<Self, FsmError> {
        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip_covers_all() -> FsmResult<()> {
        for event in Event::ALL {
            assert_eq!(Event::from_raw(event.to_raw())?, event);
        }
        assert_eq!(Event::from_raw(10), Err(FsmError::UnknownEvent(10)));
        Ok(())
    }

    #[test]
    fn test_try_from_u8_matches_from_raw() -> FsmResult<()> {
        assert_eq!(Event::try_from(Event::Error.to_raw())?, Event::Error);
        assert_eq!(Event::try_from(Event::Retry.to_raw())?, Event::Retry);
        assert_eq!(Event::try_from(200u8), Err(FsmError::UnknownEvent(200)));
        Ok(())
    }

    #[test]
    fn test_parse_event_names() -> FsmResult<()> {
        assert_eq!("continue".parse::<Event>()?, Event::Continue);
        assert_eq!("Reset".parse::<Event>()?, Event::Reset);
        assert!(matches!(
            "Explode".parse::<Event>(),
            Err(FsmError::UnknownName(_))
        ));
        Ok(())
    }
}
