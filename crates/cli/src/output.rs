//! Output formatting for CLI responses

use anyhow::Error;
use colored::Colorize;
use conveyor_fsm::{State, Transition};
use conveyor_pipeline::{CounterSnapshot, PipelineConfig};
use conveyor_watchdog::FireAction;
use serde_json::json;

use crate::error::CliError;

fn print_json(value: &serde_json::Value, what: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format {what} as JSON: {e}"),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(
        &json!({
            "success": false,
            "error": { "message": error.to_string() }
        }),
        "error",
    );
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print the result of a bounded run
pub fn print_run_summary(state: State, counters: &CounterSnapshot, json: bool) {
    if json {
        print_json(
            &json!({
                "success": true,
                "final_state": state,
                "counters": counters,
            }),
            "run summary",
        );
        return;
    }

    println!("{} {}", "Final state:".bold(), state.to_string().green());
    println!("{}", "Events:".bold());
    println!("  submitted  {}", counters.events_submitted);
    println!("  dropped    {}", counters.events_dropped);
    println!("  applied    {}", counters.events_applied);
    println!("  ignored    {}", counters.events_ignored);
    println!("{}", "Messages:".bold());
    println!("  produced   {}", counters.messages_produced);
    println!("  enqueued   {}", counters.messages_enqueued);
    println!("  dropped    {}", counters.messages_dropped_full);
    println!("  consumed   {}", counters.messages_consumed);
    println!("  alloc fail {}", counters.allocation_failures);
    println!("{}", "Pool:".bold());
    println!("  slots      {}", counters.pool.capacity);
    println!("  allocated  {}", counters.pool.allocated);
    println!("  released   {}", counters.pool.released);
    println!("  in use     {}", counters.pool.in_use);
    println!("{}", "Watchdog:".bold());
    println!("  fires      {}", counters.watchdog.fires);
    println!("  advances   {}", counters.watchdog.advances);
    println!("  disarms    {}", counters.watchdog.disarms);
}

/// Print a configuration as YAML or JSON
pub fn print_config(config: &PipelineConfig, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        print!("{}", config.to_yaml_string()?);
    }
    Ok(())
}

/// Print the transition table and the watchdog policy
pub fn print_table(rows: &[Transition], policy: &[(State, FireAction)], json: bool) {
    if json {
        let rows: Vec<_> = rows
            .iter()
            .map(|row| {
                json!({
                    "from": row.from.iter().collect::<Vec<_>>(),
                    "event": row.event,
                    "to": row.to,
                    "effect": format!("{:?}", row.effect),
                })
            })
            .collect();
        let policy: Vec<_> = policy
            .iter()
            .map(|(state, action)| {
                json!({
                    "state": state,
                    "target": action.target(),
                    "disarms": action.disarms(),
                })
            })
            .collect();
        print_json(
            &json!({ "success": true, "transitions": rows, "watchdog": policy }),
            "transition table",
        );
        return;
    }

    println!("{}", "Transitions:".bold());
    for row in rows {
        println!("  {row}");
    }
    println!("{}", "Watchdog policy:".bold());
    for (_, action) in policy {
        println!("  {action}");
    }
}
