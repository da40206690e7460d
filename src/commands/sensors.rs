//! Sensors command implementation
//!
//! Runs one polling cycle over all configured sensors.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, SensorReadings};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::Bindings;

/// Execute the sensors command
pub fn run_sensors(config: &Config, format: OutputFormat) -> Result<()> {
    let mut bindings = Bindings::sensors_from_config(config)?;
    if bindings.sensors().is_empty() {
        return Err(AppError::NoSensors);
    }

    let temps = bindings.read_temps()?.temps().to_vec();
    let readings = SensorReadings::new(bindings.sensors(), &temps);
    print_output(&readings, format)?;
    Ok(())
}
