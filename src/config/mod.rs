//! Configuration system
//!
//! Describes which fan and sensor bindings to build and the timing of the
//! fan protocols. Loaded from TOML and merged with CLI overrides.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::drivers::fan::tpacpi;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// The fan to control
    pub fan: Option<FanConfig>,
    /// Sensors, in the order their readings appear in each polling cycle
    pub sensors: Vec<SensorConfig>,
}

impl Config {
    /// Check values before any binding is constructed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.sleeptime_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "general.sleeptime_seconds".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        let depulse = self.general.depulse_seconds;
        if let Err(e) = Duration::try_from_secs_f32(depulse) {
            return Err(ConfigError::InvalidValue {
                key: "general.depulse_seconds".to_string(),
                message: format!("{}: {}", depulse, e),
            });
        }

        Ok(())
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Dry run mode
    pub dry_run: bool,
    /// Polling period in seconds
    pub sleeptime_seconds: u64,
    /// thinkpad_acpi watchdog timeout in seconds (0 disables it)
    pub watchdog_seconds: u64,
    /// Disengage the fan for this long before each write (0 disables it)
    pub depulse_seconds: f32,
    /// Don't wake up sleeping disks to read their temperature
    pub dnd_disk: bool,
}

impl GeneralConfig {
    pub fn sleeptime(&self) -> Duration {
        Duration::from_secs(self.sleeptime_seconds)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.watchdog_seconds)
    }

    /// Depulse duration; call [`Config::validate`] first
    pub fn depulse(&self) -> Duration {
        Duration::try_from_secs_f32(self.depulse_seconds).unwrap_or_default()
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            dry_run: false,
            sleeptime_seconds: tpacpi::DEFAULT_SLEEPTIME.as_secs(),
            watchdog_seconds: tpacpi::DEFAULT_WATCHDOG.as_secs(),
            depulse_seconds: 0.0,
            dnd_disk: false,
        }
    }
}

/// Fan binding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FanConfig {
    /// thinkpad_acpi fan
    TpAcpi {
        #[serde(default = "default_tp_fan_path")]
        path: PathBuf,
    },
    /// hwmon PWM fan
    Hwmon { path: PathBuf },
}

/// Sensor binding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorConfig {
    /// thinkpad_acpi multi-channel sensor
    TpAcpi {
        #[serde(default = "default_tp_sensor_path")]
        path: PathBuf,
        #[serde(default)]
        correction: Vec<i32>,
    },
    /// hwmon `temp*_input` file
    Hwmon {
        path: PathBuf,
        #[serde(default)]
        correction: Vec<i32>,
    },
    /// Hard disk via S.M.A.R.T.
    Atasmart {
        device: PathBuf,
        #[serde(default)]
        correction: Vec<i32>,
    },
    /// NVIDIA GPU via NVML
    Nvml {
        bus_id: String,
        #[serde(default)]
        correction: Vec<i32>,
    },
}

impl SensorConfig {
    pub fn correction(&self) -> &[i32] {
        match self {
            Self::TpAcpi { correction, .. }
            | Self::Hwmon { correction, .. }
            | Self::Atasmart { correction, .. }
            | Self::Nvml { correction, .. } => correction,
        }
    }
}

fn default_tp_fan_path() -> PathBuf {
    PathBuf::from(tpacpi::DEFAULT_PATH)
}

fn default_tp_sensor_path() -> PathBuf {
    PathBuf::from(crate::drivers::sensor::tpacpi::DEFAULT_PATH)
}
