//! Bindings registry
//!
//! Holds the sensor bindings (in registration order) and at most one fan
//! binding for the lifetime of the process. The decision policy drives the
//! registry once per polling period; the registry itself owns no schedule.

use crate::config::{Config, FanConfig, GeneralConfig, SensorConfig};
use crate::domain::{Level, TemperatureAggregate};
use crate::drivers::{FanDriver, HwmonFan, HwmonSensor, SensorDriver, TpFan, TpSensor};
use crate::error::{AppError, ConfigError, Result};

#[cfg(feature = "atasmart")]
use crate::drivers::DiskSensor;
#[cfg(feature = "nvml")]
use crate::drivers::GpuSensor;

/// All bindings built from one configuration
#[derive(Default)]
pub struct Bindings {
    sensors: Vec<Box<dyn SensorDriver>>,
    fan: Option<Box<dyn FanDriver>>,
    temps: TemperatureAggregate,
}

impl Bindings {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every sensor and the fan named in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut bindings = Self::sensors_from_config(config)?;

        if let Some(fan) = &config.fan {
            bindings.set_fan(open_fan(fan, &config.general)?)?;
        }

        Ok(bindings)
    }

    /// Build only the sensors named in `config`
    ///
    /// Constructing a fan binding commits to restoring it later, so read-only
    /// callers skip it.
    pub fn sensors_from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut bindings = Self::new();
        for sensor in &config.sensors {
            bindings.add_sensor(open_sensor(sensor, &config.general)?);
        }

        log::debug!(
            "{} sensor(s) providing {} temperature(s)",
            bindings.sensors.len(),
            bindings.num_temps()
        );
        Ok(bindings)
    }

    /// Register a sensor; its readings follow those of earlier sensors
    pub fn add_sensor(&mut self, sensor: Box<dyn SensorDriver>) {
        self.sensors.push(sensor);
    }

    /// Register the fan
    ///
    /// # Errors
    /// Returns `ConfigError::DuplicateFan` if a fan is already registered.
    /// The rejected binding is dropped and thereby restored.
    pub fn set_fan(&mut self, fan: Box<dyn FanDriver>) -> std::result::Result<(), ConfigError> {
        if let Some(existing) = &self.fan {
            return Err(ConfigError::DuplicateFan(existing.path().to_path_buf()));
        }
        self.fan = Some(fan);
        Ok(())
    }

    pub fn sensors(&self) -> &[Box<dyn SensorDriver>] {
        &self.sensors
    }

    pub fn fan(&self) -> Option<&dyn FanDriver> {
        self.fan.as_deref()
    }

    /// Total number of temperatures per polling cycle
    pub fn num_temps(&self) -> usize {
        self.sensors.iter().map(|s| s.num_temps()).sum()
    }

    /// Run one polling cycle over all sensors, in registration order
    ///
    /// The first failing sensor aborts the cycle and leaves the aggregate
    /// empty.
    pub fn read_temps(&mut self) -> Result<&TemperatureAggregate> {
        self.temps.clear();
        for sensor in &self.sensors {
            if let Err(e) = sensor.read_temps(&mut self.temps) {
                self.temps.clear();
                return Err(e.into());
            }
        }
        Ok(&self.temps)
    }

    /// Readings of the last polling cycle
    pub fn temps(&self) -> &TemperatureAggregate {
        &self.temps
    }

    /// Take over control of the fan
    pub fn init_fan(&mut self) -> Result<()> {
        self.fan_mut()?.init()?;
        Ok(())
    }

    pub fn set_speed(&mut self, level: &Level) -> Result<()> {
        self.fan_mut()?.set_speed(level)?;
        Ok(())
    }

    pub fn ping_watchdog_and_depulse(&mut self, level: &Level) -> Result<()> {
        self.fan_mut()?.ping_watchdog_and_depulse(level)?;
        Ok(())
    }

    /// Hand the fan back to its initial state
    ///
    /// Succeeds trivially if no fan is registered.
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(fan) = self.fan.as_mut() {
            log::debug!("Restoring fan {}", fan.path().display());
            fan.restore()?;
        }
        Ok(())
    }

    fn fan_mut(&mut self) -> Result<&mut Box<dyn FanDriver>> {
        self.fan.as_mut().ok_or(AppError::NoFan)
    }
}

fn open_fan(config: &FanConfig, general: &GeneralConfig) -> Result<Box<dyn FanDriver>> {
    let fan: Box<dyn FanDriver> = match config {
        FanConfig::TpAcpi { path } => Box::new(
            TpFan::new(path)?
                .with_watchdog(general.watchdog())
                .with_depulse(general.depulse())
                .with_sleeptime(general.sleeptime()),
        ),
        FanConfig::Hwmon { path } => Box::new(HwmonFan::new(path)?),
    };
    log::debug!("Opened fan {}", fan.path().display());
    Ok(fan)
}

#[cfg_attr(not(feature = "atasmart"), allow(unused_variables))]
fn open_sensor(config: &SensorConfig, general: &GeneralConfig) -> Result<Box<dyn SensorDriver>> {
    let mut sensor: Box<dyn SensorDriver> = match config {
        SensorConfig::TpAcpi { path, .. } => Box::new(TpSensor::new(path)?),
        SensorConfig::Hwmon { path, .. } => Box::new(HwmonSensor::new(path)?),

        #[cfg(feature = "atasmart")]
        SensorConfig::Atasmart { device, .. } => {
            Box::new(DiskSensor::open(device, general.dnd_disk)?)
        }
        #[cfg(not(feature = "atasmart"))]
        SensorConfig::Atasmart { .. } => {
            return Err(ConfigError::Unsupported("S.M.A.R.T. disk sensor".to_string()).into())
        }

        #[cfg(feature = "nvml")]
        SensorConfig::Nvml { bus_id, .. } => Box::new(GpuSensor::open(bus_id)?),
        #[cfg(not(feature = "nvml"))]
        SensorConfig::Nvml { .. } => {
            return Err(ConfigError::Unsupported("NVML GPU sensor".to_string()).into())
        }
    };

    sensor.set_correction(config.correction())?;
    log::debug!(
        "Opened sensor {} with {} temperature(s)",
        sensor.path().display(),
        sensor.num_temps()
    );
    Ok(sensor)
}
