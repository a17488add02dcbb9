//! Error types for conveyorctl

use conveyor_pipeline::{ConfigError, PipelineError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument(_) => 2,
            Self::Config(_) | Self::Json(_) => 4,
            Self::Pipeline(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_validation_code() {
        let err = CliError::from(ConfigError::invalid("time_unit_ms must be greater than 0"));
        assert_eq!(err.exit_code(), 4);
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration: time_unit_ms must be greater than 0"
        );
    }

    #[test]
    fn json_errors_map_to_validation_code() -> Result<(), Box<dyn std::error::Error>> {
        let source = serde_json::from_str::<serde_json::Value>("{")
            .err()
            .ok_or("truncated JSON must not parse")?;
        let err = CliError::from(source);
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().starts_with("JSON error: "));
        Ok(())
    }

    #[test]
    fn pipeline_errors_have_their_own_code() {
        let err = CliError::from(PipelineError::ThreadPanicked("conveyor-consumer".into()));
        assert_eq!(err.exit_code(), 5);
    }
}
