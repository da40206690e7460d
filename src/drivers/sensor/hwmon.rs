//! sysfs hwmon temperature binding

use crate::domain::{Temperature, TemperatureAggregate};
use crate::drivers::sensor::SensorBase;
use crate::drivers::traits::SensorDriver;
use crate::error::DriverError;
use crate::kernel::{ControlFs, SysFs};

use std::io;
use std::path::PathBuf;

/// Single `temp*_input` file reporting millidegrees Celsius
#[derive(Debug)]
pub struct HwmonSensor<F: ControlFs = SysFs> {
    fs: F,
    base: SensorBase,
}

impl HwmonSensor<SysFs> {
    /// Open the hwmon sensor at `path`
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        Self::with_fs(SysFs, path)
    }
}

impl<F: ControlFs> HwmonSensor<F> {
    /// Open the sensor through a specific [`ControlFs`]
    pub fn with_fs(fs: F, path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        let mut base = SensorBase::open(&fs, path)?;
        base.set_num_temps(1);
        Ok(Self { fs, base })
    }

    fn read_millicelsius(&self) -> io::Result<i32> {
        let content = self.fs.read_to_string(self.base.path())?;
        let raw = content.split_whitespace().next().unwrap_or_default();
        raw.parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("'{}' is not a temperature", raw),
            )
        })
    }
}

impl<F: ControlFs> SensorDriver for HwmonSensor<F> {
    fn base(&self) -> &SensorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SensorBase {
        &mut self.base
    }

    fn read_temps(&self, temps: &mut TemperatureAggregate) -> Result<(), DriverError> {
        let millicelsius = self.read_millicelsius().map_err(|e| {
            DriverError::io(
                format!("Failed to read temperature from {}", self.base.path().display()),
                e,
            )
        })?;
        let celsius = Temperature::from_millicelsius(millicelsius).as_celsius();
        temps.push(self.base.corrected(0, celsius));
        Ok(())
    }
}
