//! Error types for the pipeline runtime.

use conveyor_watchdog::WatchdogError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`crate::PipelineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The configuration file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The YAML document did not match the configuration schema.
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document did not match the configuration schema.
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not one of `yaml`, `yml` or `json`.
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Errors raised while starting or stopping a [`crate::Pipeline`].
///
/// Dropped events, dropped messages, ignored transitions and allocation
/// failures are not errors; they show up in outcomes and counters.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Watchdog timer could not be configured or started.
    #[error(transparent)]
    Watchdog(#[from] WatchdogError),

    /// A worker thread could not be spawned.
    #[error("Failed to spawn thread {thread}: {source}")]
    Spawn {
        /// Name of the thread.
        thread: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before it was joined.
    #[error("Thread {0} panicked")]
    ThreadPanicked(String),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::invalid("event_capacity must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: event_capacity must be greater than 0"
        );

        let err = PipelineError::from(ConfigError::UnsupportedFormat("toml".into()));
        assert_eq!(err.to_string(), "Unsupported configuration format: toml");

        let err = PipelineError::ThreadPanicked("conveyor-producer".into());
        assert_eq!(err.to_string(), "Thread conveyor-producer panicked");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = ConfigError::Io {
            path: PathBuf::from("/missing/pipeline.yaml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("Failed to read /missing/pipeline.yaml"));
    }
}
