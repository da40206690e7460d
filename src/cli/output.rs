//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::Temperature;
use crate::drivers::SensorDriver;
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).map_err(io::Error::from)?;
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// Readings of one sensor binding
#[derive(Debug, Clone, Serialize)]
pub struct SensorReading {
    pub path: String,
    pub temps: Vec<Temperature>,
}

/// One polling cycle over all sensors
#[derive(Debug, Clone, Serialize)]
pub struct SensorReadings {
    pub sensors: Vec<SensorReading>,
    pub max: Option<Temperature>,
}

impl SensorReadings {
    /// Split a flat polling cycle back into per-sensor readings
    pub fn new(sensors: &[Box<dyn SensorDriver>], temps: &[Temperature]) -> Self {
        let mut offset = 0;
        let sensors = sensors
            .iter()
            .map(|sensor| {
                let end = (offset + sensor.num_temps()).min(temps.len());
                let reading = SensorReading {
                    path: sensor.path().display().to_string(),
                    temps: temps[offset..end].to_vec(),
                };
                offset = end;
                reading
            })
            .collect();

        Self {
            sensors,
            max: temps.iter().max().copied(),
        }
    }
}

impl TableDisplay for SensorReadings {
    fn to_table(&self) -> String {
        let mut output = String::new();

        for sensor in &self.sensors {
            let temps: Vec<String> = sensor.temps.iter().map(|t| t.to_string()).collect();
            output.push_str(&format!("{}\n  {}\n", sensor.path, temps.join(", ")));
        }

        if let Some(max) = self.max {
            output.push_str(&format!("Max: {}", max));
        }

        output
    }

    fn to_compact(&self) -> String {
        self.sensors
            .iter()
            .flat_map(|s| s.temps.iter())
            .map(|t| t.as_celsius().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Summary of one opened binding
#[derive(Debug, Clone, Serialize)]
pub struct BindingSummary {
    pub path: String,
    pub num_temps: usize,
}

/// Result of the check command
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub sensors: Vec<BindingSummary>,
    pub num_temps: usize,
    pub fan: Option<String>,
}

impl TableDisplay for CheckReport {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Sensors: {} ({} temperatures)\n",
            self.sensors.len(),
            self.num_temps
        );

        for sensor in &self.sensors {
            output.push_str(&format!("  {} [{}]\n", sensor.path, sensor.num_temps));
        }

        match &self.fan {
            Some(fan) => output.push_str(&format!("Fan: {}", fan)),
            None => output.push_str("Fan: none"),
        }

        output
    }

    fn to_compact(&self) -> String {
        format!(
            "sensors={} temps={} fan={}",
            self.sensors.len(),
            self.num_temps,
            self.fan.as_deref().unwrap_or("none")
        )
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }

    fn to_compact(&self) -> String {
        self.message.clone()
    }
}
