//! Check command implementation
//!
//! Opens every configured binding and reads the sensors once, so that
//! configuration mistakes surface before the daemon takes over the fan.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, BindingSummary, CheckReport};
use crate::config::Config;
use crate::error::Result;
use crate::services::Bindings;

/// Execute the check command
///
/// Opening the fan reads its state and writes that same state back when the
/// check is done. In dry-run mode the fan is left alone.
pub fn run_check(config: &Config, format: OutputFormat) -> Result<()> {
    let mut bindings = if config.general.dry_run {
        Bindings::sensors_from_config(config)?
    } else {
        Bindings::from_config(config)?
    };

    bindings.read_temps()?;
    let report = report(&bindings);
    bindings.shutdown()?;

    print_output(&report, format)?;
    Ok(())
}

fn report(bindings: &Bindings) -> CheckReport {
    CheckReport {
        sensors: bindings
            .sensors()
            .iter()
            .map(|s| BindingSummary {
                path: s.path().display().to_string(),
                num_temps: s.num_temps(),
            })
            .collect(),
        num_temps: bindings.num_temps(),
        fan: bindings.fan().map(|f| f.path().display().to_string()),
    }
}
