//! Pipeline configuration.
//!
//! Durations are expressed in time-units so a whole run can be sped up by
//! changing [`PipelineConfig::time_unit_ms`]. Missing fields in a file take
//! their defaults.

use conveyor_fsm::{Event, State, StateSet};
use conveyor_watchdog::{WatchdogConfig, WatchdogResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Watchdog section of [`PipelineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogSettings {
    /// Expiry period in time-units.
    pub period: u32,
    /// Whether the watchdog timer runs at all.
    pub enabled: bool,
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            period: 5,
            enabled: true,
        }
    }
}

/// One periodic event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSourceConfig {
    /// Short name, used in the thread name and logs.
    pub name: String,
    /// Event submitted when triggered.
    pub event: Event,
    /// Sleep between observations, in time-units.
    pub period: u32,
    /// States in which the source submits its event.
    pub triggers: Vec<State>,
}

impl EventSourceConfig {
    /// Create a source configuration.
    pub fn new(name: impl Into<String>, event: Event, period: u32, triggers: &[State]) -> Self {
        Self {
            name: name.into(),
            event,
            period,
            triggers: triggers.to_vec(),
        }
    }

    /// Trigger states as a set.
    #[must_use]
    pub fn trigger_set(&self) -> StateSet {
        self.triggers.iter().copied().collect()
    }

    /// The six sources of the reference system.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("start", Event::Start, 5, &[State::Idle, State::Paused]),
            Self::new("stop", Event::Stop, 20, &[State::Running, State::Paused]),
            Self::new("pause", Event::Pause, 10, &[State::Running]),
            Self::new("resume", Event::Resume, 15, &[State::Waiting]),
            Self::new("recover", Event::Recover, 25, &[State::Error]),
            Self::new("reset", Event::Reset, 30, &[State::Finished]),
        ]
    }
}

/// Configuration for a [`crate::Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Length of one time-unit in milliseconds.
    ///
    /// Default: 1000.
    pub time_unit_ms: u64,

    /// Capacity of the event channel.
    ///
    /// Default: 10.
    pub event_capacity: usize,

    /// Capacity of the data channel.
    ///
    /// Default: 10.
    pub data_capacity: usize,

    /// Number of message slots in the pool.
    ///
    /// Default: `data_capacity + 2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_pool_slots: Option<usize>,

    /// Producer pause after each attempt, in time-units.
    pub production_interval: u32,

    /// Consumer pause after each message, in time-units.
    pub consumption_interval: u32,

    /// Longest wait on the state-change signal while not running, in
    /// time-units.
    pub idle_interval: u32,

    /// Producer pause after a failed allocation, in milliseconds.
    ///
    /// Default: 10.
    pub allocation_retry_interval_ms: u64,

    /// Time held in Reset before returning to Idle, in time-units.
    ///
    /// Default: 2.
    pub reset_settle: u32,

    /// Watchdog timer settings.
    pub watchdog: WatchdogSettings,

    /// Periodic event sources.
    pub sources: Vec<EventSourceConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: 1000,
            event_capacity: 10,
            data_capacity: 10,
            message_pool_slots: None,
            production_interval: 1,
            consumption_interval: 1,
            idle_interval: 1,
            allocation_retry_interval_ms: 10,
            reset_settle: 2,
            watchdog: WatchdogSettings::default(),
            sources: EventSourceConfig::defaults(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or invalid.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the extension is not
    /// `yaml`, `yml` or `json`, or the contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&contents),
            "json" => Self::from_json_str(&contents),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Serialize as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_unit_ms == 0 {
            return Err(ConfigError::invalid("time_unit_ms must be greater than 0"));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::invalid("event_capacity must be greater than 0"));
        }
        if self.data_capacity == 0 {
            return Err(ConfigError::invalid("data_capacity must be greater than 0"));
        }
        if self.pool_slots() == 0 {
            return Err(ConfigError::invalid(
                "message_pool_slots must be greater than 0",
            ));
        }
        if self.idle_interval == 0 {
            return Err(ConfigError::invalid("idle_interval must be greater than 0"));
        }
        if self.watchdog.enabled && self.watchdog.period == 0 {
            return Err(ConfigError::invalid(
                "watchdog.period must be greater than 0",
            ));
        }
        for source in &self.sources {
            if source.name.is_empty() {
                return Err(ConfigError::invalid("source name must not be empty"));
            }
            if source.period == 0 {
                return Err(ConfigError::invalid(format!(
                    "source {} period must be greater than 0",
                    source.name
                )));
            }
            if source.triggers.is_empty() {
                return Err(ConfigError::invalid(format!(
                    "source {} must have at least one trigger state",
                    source.name
                )));
            }
        }
        Ok(())
    }

    /// Duration of `units` time-units.
    #[must_use]
    pub fn units(&self, units: u32) -> Duration {
        Duration::from_millis(self.time_unit_ms.saturating_mul(u64::from(units)))
    }

    /// Effective message pool size.
    #[must_use]
    pub fn pool_slots(&self) -> usize {
        self.message_pool_slots
            .unwrap_or_else(|| self.data_capacity.saturating_add(2))
    }

    /// Producer pause after each attempt.
    #[must_use]
    pub fn production_duration(&self) -> Duration {
        self.units(self.production_interval)
    }

    /// Consumer pause after each message.
    #[must_use]
    pub fn consumption_duration(&self) -> Duration {
        self.units(self.consumption_interval)
    }

    /// Upper bound of an idle wait.
    #[must_use]
    pub fn idle_duration(&self) -> Duration {
        self.units(self.idle_interval)
    }

    /// Producer pause after a failed allocation.
    #[must_use]
    pub fn allocation_retry_duration(&self) -> Duration {
        Duration::from_millis(self.allocation_retry_interval_ms)
    }

    /// Reset settle window.
    #[must_use]
    pub fn reset_settle_duration(&self) -> Duration {
        self.units(self.reset_settle)
    }

    /// Watchdog timer configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is zero.
    pub fn watchdog_config(&self) -> WatchdogResult<WatchdogConfig> {
        WatchdogConfig::builder()
            .period(self.units(self.watchdog.period))
            .build()
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the time-unit length in milliseconds.
    #[must_use]
    pub fn time_unit_ms(mut self, ms: u64) -> Self {
        self.config.time_unit_ms = ms;
        self
    }

    /// Set the event channel capacity.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Set the data channel capacity.
    #[must_use]
    pub fn data_capacity(mut self, capacity: usize) -> Self {
        self.config.data_capacity = capacity;
        self
    }

    /// Set the message pool size explicitly.
    #[must_use]
    pub fn message_pool_slots(mut self, slots: usize) -> Self {
        self.config.message_pool_slots = Some(slots);
        self
    }

    /// Set the producer interval in time-units.
    #[must_use]
    pub fn production_interval(mut self, units: u32) -> Self {
        self.config.production_interval = units;
        self
    }

    /// Set the consumer interval in time-units.
    #[must_use]
    pub fn consumption_interval(mut self, units: u32) -> Self {
        self.config.consumption_interval = units;
        self
    }

    /// Set the idle wait bound in time-units.
    #[must_use]
    pub fn idle_interval(mut self, units: u32) -> Self {
        self.config.idle_interval = units;
        self
    }

    /// Set the allocation retry pause in milliseconds.
    #[must_use]
    pub fn allocation_retry_interval_ms(mut self, ms: u64) -> Self {
        self.config.allocation_retry_interval_ms = ms;
        self
    }

    /// Set the reset settle window in time-units.
    #[must_use]
    pub fn reset_settle(mut self, units: u32) -> Self {
        self.config.reset_settle = units;
        self
    }

    /// Set the watchdog period in time-units.
    #[must_use]
    pub fn watchdog_period(mut self, units: u32) -> Self {
        self.config.watchdog.period = units;
        self
    }

    /// Enable or disable the watchdog timer.
    #[must_use]
    pub fn watchdog_enabled(mut self, enabled: bool) -> Self {
        self.config.watchdog.enabled = enabled;
        self
    }

    /// Replace the event sources.
    #[must_use]
    pub fn sources(mut self, sources: Vec<EventSourceConfig>) -> Self {
        self.config.sources = sources;
        self
    }

    /// Add one event source.
    #[must_use]
    pub fn source(mut self, source: EventSourceConfig) -> Self {
        self.config.sources.push(source);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.time_unit_ms, 1000);
        assert_eq!(config.event_capacity, 10);
        assert_eq!(config.data_capacity, 10);
        assert_eq!(config.pool_slots(), 12);
        assert_eq!(config.reset_settle_duration(), Duration::from_secs(2));
        assert_eq!(config.watchdog.period, 5);
        assert!(config.watchdog.enabled);
        assert_eq!(config.sources.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_sources() {
        let sources = EventSourceConfig::defaults();
        let stop = sources.iter().find(|s| s.name == "stop");
        let stop = stop.map(|s| (s.event, s.period, s.trigger_set()));
        assert_eq!(
            stop,
            Some((
                Event::Stop,
                20,
                StateSet::of(&[State::Running, State::Paused])
            ))
        );
    }

    #[test]
    fn test_units_scale_with_time_unit() -> TestResult {
        let config = PipelineConfig::builder()
            .time_unit_ms(10)
            .watchdog_period(3)
            .build()?;
        assert_eq!(config.production_duration(), Duration::from_millis(10));
        assert_eq!(config.watchdog_config()?.period, Duration::from_millis(30));
        Ok(())
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(PipelineConfig::builder().event_capacity(0).build().is_err());
        assert!(PipelineConfig::builder().data_capacity(0).build().is_err());
        assert!(PipelineConfig::builder().time_unit_ms(0).build().is_err());
        assert!(PipelineConfig::builder().message_pool_slots(0).build().is_err());
        assert!(PipelineConfig::builder().watchdog_period(0).build().is_err());
        assert!(
            PipelineConfig::builder()
                .source(EventSourceConfig::new("noop", Event::Wait, 0, &[State::Running]))
                .build()
                .is_err()
        );
        assert!(
            PipelineConfig::builder()
                .source(EventSourceConfig::new("noop", Event::Wait, 1, &[]))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_disabled_watchdog_allows_zero_period() -> TestResult {
        let config = PipelineConfig::builder()
            .watchdog_enabled(false)
            .watchdog_period(0)
            .build()?;
        assert!(!config.watchdog.enabled);
        Ok(())
    }

    #[test]
    fn test_partial_yaml_uses_defaults() -> TestResult {
        let config = PipelineConfig::from_yaml_str(
            "time_unit_ms: 50\ndata_capacity: 4\nwatchdog:\n  enabled: false\nsources: []\n",
        )?;
        assert_eq!(config.time_unit_ms, 50);
        assert_eq!(config.pool_slots(), 6);
        assert_eq!(config.event_capacity, 10);
        assert!(!config.watchdog.enabled);
        assert_eq!(config.watchdog.period, 5);
        assert!(config.sources.is_empty());
        Ok(())
    }

    #[test]
    fn test_json_sources_parse_names() -> TestResult {
        let config = PipelineConfig::from_json_str(
            r#"{"sources":[{"name":"kick","event":"Start","period":1,"triggers":["Idle"]}]}"#,
        )?;
        assert_eq!(config.sources.len(), 1);
        assert_eq!(
            config.sources.first().map(|s| s.event),
            Some(Event::Start)
        );
        Ok(())
    }

    #[test]
    fn test_invalid_yaml_value_rejected() {
        let result = PipelineConfig::from_yaml_str("event_capacity: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_yaml_roundtrip_preserves_sources() -> TestResult {
        let config = PipelineConfig::default();
        let yaml = config.to_yaml_string()?;
        assert_eq!(PipelineConfig::from_yaml_str(&yaml)?, config);
        Ok(())
    }
}
