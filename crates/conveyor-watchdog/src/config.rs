//! Configuration types for the watchdog timer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{WatchdogError, WatchdogResult};

/// Watchdog timer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Time between expiries.
    ///
    /// Default: 5 seconds.
    pub period: Duration,

    /// Whether the timer is armed when spawned.
    ///
    /// Default: true.
    pub start_armed: bool,
}

impl WatchdogConfig {
    /// Default expiry period.
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

    /// Create a configuration with the given period.
    ///
    /// # Errors
    ///
    /// Returns an error if `period` is zero.
    pub fn new(period: Duration) -> WatchdogResult<Self> {
        let config = Self {
            period,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WatchdogConfigBuilder {
        WatchdogConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> WatchdogResult<()> {
        if self.period.is_zero() {
            return Err(WatchdogError::invalid_configuration(
                "period must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            start_armed: true,
        }
    }
}

/// Builder for `WatchdogConfig`.
#[derive(Debug, Default)]
pub struct WatchdogConfigBuilder {
    config: WatchdogConfig,
}

impl WatchdogConfigBuilder {
    /// Set the expiry period.
    #[must_use]
    pub fn period(mut self, period: Duration) -> Self {
        self.config.period = period;
        self
    }

    /// Set whether the timer starts armed.
    #[must_use]
    pub fn start_armed(mut self, armed: bool) -> Self {
        self.config.start_armed = armed;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WatchdogResult<WatchdogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatchdogConfig::default();
        assert_eq!(config.period, Duration::from_secs(5));
        assert!(config.start_armed);
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = WatchdogConfig::new(Duration::ZERO);
        assert!(matches!(
            result,
            Err(WatchdogError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_builder() -> WatchdogResult<()> {
        let config = WatchdogConfig::builder()
            .period(Duration::from_millis(250))
            .start_armed(false)
            .build()?;
        assert_eq!(config.period, Duration::from_millis(250));
        assert!(!config.start_armed);
        Ok(())
    }
}
