//! `run` command: start the pipeline for a bounded time

use anyhow::Result;
use conveyor_fsm::Event;
use conveyor_pipeline::Pipeline;
use std::time::{Duration, Instant};

use crate::commands::ConfigArgs;
use crate::commands::config::resolve;
use crate::error::CliError;
use crate::output;

pub struct RunOptions<'a> {
    pub config: &'a ConfigArgs,
    pub duration_units: u32,
    pub events: &'a [Event],
}

pub fn execute(options: &RunOptions<'_>, json: bool) -> Result<()> {
    if options.duration_units == 0 {
        return Err(
            CliError::InvalidArgument("--duration-units must be greater than 0".into()).into(),
        );
    }
    let config = resolve(options.config)?;
    let run_for = config.units(options.duration_units);

    tracing::info!(
        time_unit_ms = config.time_unit_ms,
        duration = ?run_for,
        sources = config.sources.len(),
        watchdog = config.watchdog.enabled,
        "Starting pipeline"
    );
    let pipeline = Pipeline::start(config).map_err(CliError::from)?;

    for event in options.events {
        if !pipeline.submit_event(*event) {
            tracing::warn!(%event, "Initial event dropped");
        }
    }

    let deadline = Instant::now()
        .checked_add(run_for)
        .ok_or_else(|| CliError::InvalidArgument("run duration is too long".into()))?;
    let mut seen = pipeline.state();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        let now = pipeline
            .shared_state()
            .wait_for_change(seen, remaining.min(Duration::from_millis(250)));
        if now != seen {
            if !json {
                println!("state: {seen} -> {now}");
            }
            seen = now;
        }
    }

    let state = pipeline.state();
    let counters = pipeline.shutdown().map_err(CliError::from)?;
    output::print_run_summary(state, &counters, json);
    Ok(())
}
