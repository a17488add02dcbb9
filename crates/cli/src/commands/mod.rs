//! Command implementations for conveyorctl

pub mod config;
pub mod run;
pub mod table;

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Options shared by commands that read a configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, env = "CONVEYOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the time-unit length in milliseconds
    #[arg(long)]
    pub time_unit_ms: Option<u64>,

    /// Run without the watchdog timer
    #[arg(long)]
    pub no_watchdog: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show {
        #[command(flatten)]
        args: ConfigArgs,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate
        path: PathBuf,
    },
}
