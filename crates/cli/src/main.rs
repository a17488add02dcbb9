//! conveyorctl - conveyor pipeline runner
//!
//! Starts the state-gated producer/consumer pipeline for a bounded time and
//! reports what happened, or inspects configuration and lifecycle policy.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use conveyor_fsm::Event;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{ConfigArgs, ConfigCommands};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "conveyorctl")]
#[command(about = "Run and inspect the conveyor pipeline")]
#[command(version)]
#[command(long_about = "
conveyorctl runs the conveyor pipeline: a producer and a consumer exchanging
bounded messages while a lifecycle state machine, driven by periodic event
sources and a watchdog timer, allows it.

Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for a bounded number of time-units
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// How long to run, in time-units
        #[arg(short, long, default_value_t = 60)]
        duration_units: u32,

        /// Events to submit right after start (e.g. --event start)
        #[arg(short, long = "event")]
        events: Vec<Event>,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Print the transition table and watchdog policy
    Table,
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_env_err| format!("conveyor={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run {
            config,
            duration_units,
            events,
        } => commands::run::execute(
            &commands::run::RunOptions {
                config,
                duration_units: *duration_units,
                events,
            },
            cli.json,
        ),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.json),
        Commands::Table => {
            commands::table::execute(cli.json);
            Ok(())
        }
    }
}
