//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod fan;
pub mod sensors;

pub use check::run_check;
pub use fan::run_fan;
pub use sensors::run_sensors;

use crate::cli::Cli;
use crate::config::{Config, ConfigBuilder};
use crate::error::Result;

/// Merge the configuration file with the command-line overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_verbose(Cli::flag(cli.verbose))
        .with_dry_run(Cli::flag(cli.dry_run))
        .with_sleeptime(cli.sleeptime)
        .with_depulse(cli.depulse)
        .with_dnd_disk(Cli::flag(cli.dnd_disk))
        .build()?;
    Ok(config)
}
