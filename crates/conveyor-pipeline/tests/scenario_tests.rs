//! End-to-end scenarios for the running pipeline.

use conveyor_pipeline::prelude::*;
use conveyor_test_helpers::prelude::*;
use std::time::{Duration, Instant};

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Fast, quiet pipeline: 5 ms time-unit, no sources, no watchdog.
fn quiet_config() -> Result<PipelineConfig, ConfigError> {
    PipelineConfig::builder()
        .time_unit_ms(5)
        .sources(Vec::new())
        .watchdog_enabled(false)
        .build()
}

#[test]
fn scenario_event_sequence_follows_table() -> TestResult {
    let pipeline = Pipeline::start(quiet_config()?)?;
    let shared = pipeline.shared_state();

    let steps = [
        (Event::Start, State::Running),
        (Event::Pause, State::Waiting),
        (Event::Resume, State::Running),
        (Event::Error, State::Error),
        (Event::Recover, State::Retry),
    ];
    for (event, expected) in steps {
        assert!(pipeline.submit_event(event));
        assert!(
            wait_for_state(shared, expected, DEFAULT_TIMEOUT),
            "{event} should lead to {expected}"
        );
    }

    // Retry while already in Retry has no row.
    assert!(pipeline.submit_event(Event::Retry));
    assert!(eventually(DEFAULT_TIMEOUT, || pipeline.counters().events_ignored == 1));
    assert_eq!(pipeline.state(), State::Retry);

    let counters = pipeline.shutdown()?;
    assert_eq!(counters.events_applied, 5);
    assert_eq!(counters.events_ignored, 1);
    Ok(())
}

#[test]
fn scenario_reset_holds_then_returns_to_idle() -> TestResult {
    let config = PipelineConfig::builder()
        .time_unit_ms(5)
        .reset_settle(20)
        .sources(Vec::new())
        .watchdog_enabled(false)
        .build()?;
    let pipeline = Pipeline::builder()
        .config(config)
        .initial_state(State::Finished)
        .start()?;
    let shared = pipeline.shared_state();

    assert!(pipeline.submit_event(Event::Reset));
    assert!(wait_for_state(shared, State::Reset, DEFAULT_TIMEOUT));
    let entered = Instant::now();

    // Queued during the window, applied only after it closes.
    assert!(pipeline.submit_event(Event::Start));
    assert!(wait_for_state(shared, State::Running, DEFAULT_TIMEOUT));
    assert!(entered.elapsed() >= Duration::from_millis(50));

    let counters = pipeline.shutdown()?;
    assert_eq!(counters.events_applied, 2);
    Ok(())
}

#[test]
fn scenario_watchdog_starts_and_finishes_without_events() -> TestResult {
    let config = PipelineConfig::builder()
        .time_unit_ms(5)
        .watchdog_period(4)
        .sources(Vec::new())
        .build()?;
    let pipeline = Pipeline::start(config)?;
    let shared = pipeline.shared_state();

    assert!(wait_for_state(shared, State::Running, DEFAULT_TIMEOUT));
    assert!(wait_for_state(shared, State::Finished, DEFAULT_TIMEOUT));
    let watchdog = must_some(pipeline.watchdog(), "watchdog enabled");
    assert!(eventually(DEFAULT_TIMEOUT, || !watchdog.is_armed()));

    let counters = pipeline.shutdown()?;
    assert_eq!(counters.events_applied, 0);
    assert_eq!(counters.watchdog.advances, 2);
    Ok(())
}

#[test]
fn scenario_stop_event_disarms_watchdog() -> TestResult {
    let config = PipelineConfig::builder()
        .time_unit_ms(5)
        .watchdog_period(2000)
        .sources(Vec::new())
        .build()?;
    let pipeline = Pipeline::start(config)?;
    let shared = pipeline.shared_state();

    assert!(pipeline.submit_event(Event::Start));
    assert!(wait_for_state(shared, State::Running, DEFAULT_TIMEOUT));
    assert!(pipeline.submit_event(Event::Stop));
    assert!(wait_for_state(shared, State::Finished, DEFAULT_TIMEOUT));

    let watchdog = must_some(pipeline.watchdog(), "watchdog enabled");
    assert!(eventually(DEFAULT_TIMEOUT, || !watchdog.is_armed()));

    let counters = pipeline.shutdown()?;
    assert_eq!(counters.watchdog.disarms, 1);
    assert_eq!(counters.watchdog.advances, 0);
    Ok(())
}

#[test]
fn scenario_messages_flow_without_leaks() -> TestResult {
    let pipeline = Pipeline::start(quiet_config()?)?;
    assert!(pipeline.submit_event(Event::Start));
    assert!(eventually(DEFAULT_TIMEOUT, || {
        pipeline.counters().messages_consumed >= 5
    }));

    assert!(pipeline.submit_event(Event::Stop));
    assert!(wait_for_state(
        pipeline.shared_state(),
        State::Finished,
        DEFAULT_TIMEOUT
    ));

    let counters = pipeline.shutdown()?;
    assert_eq!(
        counters.messages_produced,
        counters.messages_enqueued + counters.messages_dropped_full
    );
    assert!(counters.messages_consumed <= counters.messages_enqueued);
    assert_eq!(counters.pool.allocated, counters.messages_produced);
    // Every slot is back once the channels are gone.
    assert_eq!(counters.pool.in_use, 0);
    assert_eq!(counters.pool.allocated, counters.pool.released);
    Ok(())
}

#[test]
fn scenario_configured_sources_drive_the_lifecycle() -> TestResult {
    let config = PipelineConfig::builder()
        .time_unit_ms(5)
        .watchdog_enabled(false)
        .sources(vec![
            EventSourceConfig::new("start", Event::Start, 2, &[State::Idle, State::Paused]),
            EventSourceConfig::new("stop", Event::Stop, 8, &[State::Running, State::Paused]),
        ])
        .build()?;
    let pipeline = Pipeline::start(config)?;
    let shared = pipeline.shared_state();

    assert!(wait_for_state(shared, State::Running, DEFAULT_TIMEOUT));
    assert!(wait_for_state(shared, State::Finished, DEFAULT_TIMEOUT));

    let counters = pipeline.shutdown()?;
    assert!(counters.events_submitted >= 2);
    Ok(())
}

struct OneShot {
    fired: bool,
}

impl EventProducer for OneShot {
    fn name(&self) -> &str {
        "one-shot"
    }

    fn period(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn poll(&mut self, _state: State) -> Option<Event> {
        if self.fired {
            return None;
        }
        self.fired = true;
        Some(Event::Start)
    }
}

#[test]
fn scenario_custom_event_producer() -> TestResult {
    let pipeline = Pipeline::builder()
        .config(quiet_config()?)
        .source(OneShot { fired: false })
        .start()?;

    assert!(wait_for_state(
        pipeline.shared_state(),
        State::Running,
        DEFAULT_TIMEOUT
    ));
    let counters = pipeline.shutdown()?;
    assert_eq!(counters.events_submitted, 1);
    Ok(())
}

#[test]
fn scenario_shutdown_leaves_state_alone() -> TestResult {
    let pipeline = Pipeline::start(quiet_config()?)?;
    assert!(pipeline.submit_event(Event::Start));
    assert!(wait_for_state(
        pipeline.shared_state(),
        State::Running,
        DEFAULT_TIMEOUT
    ));

    let shared = std::sync::Arc::clone(pipeline.shared_state());
    pipeline.shutdown()?;
    assert_eq!(shared.load(), State::Running);
    Ok(())
}

#[test]
fn scenario_invalid_config_is_rejected_before_spawning() {
    let config = PipelineConfig {
        event_capacity: 0,
        ..PipelineConfig::default()
    };
    let result = Pipeline::start(config);
    assert!(matches!(
        result,
        Err(PipelineError::Config(ConfigError::Invalid(_)))
    ));
}
