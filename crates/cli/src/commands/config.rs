//! Configuration loading and the `config` subcommands

use anyhow::Result;
use conveyor_pipeline::PipelineConfig;

use crate::commands::{ConfigArgs, ConfigCommands};
use crate::error::CliError;
use crate::output;

/// Build the effective configuration from a file and overrides
pub fn resolve(args: &ConfigArgs) -> Result<PipelineConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(ms) = args.time_unit_ms {
        config.time_unit_ms = ms;
    }
    if args.no_watchdog {
        config.watchdog.enabled = false;
    }
    config.validate()?;
    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}

pub fn execute(cmd: &ConfigCommands, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Show { args } => {
            let config = resolve(args)?;
            output::print_config(&config, json)?;
            Ok(())
        }
        ConfigCommands::Validate { path } => {
            let config = PipelineConfig::load(path).map_err(CliError::from)?;
            if json {
                let report = serde_json::json!({
                    "success": true,
                    "path": path,
                    "sources": config.sources.len(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).map_err(CliError::from)?
                );
            } else {
                println!("{} is valid ({} sources)", path.display(), config.sources.len());
            }
            Ok(())
        }
    }
}
