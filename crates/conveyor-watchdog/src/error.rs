//! Error types for the watchdog timer.

use thiserror::Error;

/// Errors that can occur while configuring or running the watchdog timer.
///
/// A fire that changes nothing is not an error; see
/// [`FireAction::Disarm`](crate::FireAction::Disarm).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The timer thread could not be spawned.
    #[error("Failed to spawn watchdog thread: {0}")]
    SpawnFailed(String),

    /// The timer thread panicked before it was joined.
    #[error("Watchdog thread panicked")]
    ThreadPanicked,
}

impl WatchdogError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create a spawn failed error.
    #[must_use]
    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self::SpawnFailed(reason.into())
    }
}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = std::result::Result<T, WatchdogError>;
