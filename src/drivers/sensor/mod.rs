//! Sensor bindings
//!
//! - [`HwmonSensor`]: one `temp*_input` file in sysfs
//! - [`TpSensor`]: thinkpad_acpi, typically `/proc/acpi/ibm/thermal`
//! - [`DiskSensor`]: hard disks via S.M.A.R.T. (feature `atasmart`)
//! - [`GpuSensor`]: NVIDIA GPUs via NVML (feature `nvml`)

pub mod hwmon;
pub mod tpacpi;

#[cfg(feature = "atasmart")]
pub mod atasmart;
#[cfg(feature = "nvml")]
pub mod nvml;

pub use hwmon::HwmonSensor;
pub use tpacpi::TpSensor;

#[cfg(feature = "atasmart")]
pub use atasmart::DiskSensor;
#[cfg(feature = "nvml")]
pub use nvml::GpuSensor;

use crate::domain::Temperature;
use crate::error::{ConfigError, DriverError};
use crate::kernel::ControlFs;

use std::path::{Path, PathBuf};

/// State shared by all sensor bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorBase {
    path: PathBuf,
    num_temps: usize,
    correction: Vec<i32>,
}

impl SensorBase {
    /// Create the base of a file-backed sensor, checking that `path` is readable
    pub fn open<F: ControlFs>(fs: &F, path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        let path = path.into();
        fs.probe(&path).map_err(|e| {
            DriverError::io(format!("Initializing sensor {}", path.display()), e)
        })?;
        Ok(Self::new(path))
    }

    /// Create the base of a sensor that is not a plain file (PCI bus id, ...)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            num_temps: 0,
            correction: Vec::new(),
        }
    }

    /// File, device or bus id the sensor reads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Channels per reading
    pub fn num_temps(&self) -> usize {
        self.num_temps
    }

    /// Per-channel offsets, always exactly `num_temps()` long
    pub fn correction(&self) -> &[i32] {
        &self.correction
    }

    /// Set the channel count, zero-filling new correction entries
    pub fn set_num_temps(&mut self, n: usize) {
        self.num_temps = n;
        self.correction.resize(n, 0);
    }

    /// Set per-channel offsets
    ///
    /// A shorter vector is zero-padded with a warning.
    ///
    /// # Errors
    /// Returns `ConfigError::CorrectionLength` if there are more offsets than
    /// channels.
    pub fn set_correction(&mut self, correction: &[i32]) -> Result<(), ConfigError> {
        let err = ConfigError::CorrectionLength {
            path: self.path.clone(),
            len: correction.len(),
            num_temps: self.num_temps,
        };

        if correction.len() > self.num_temps {
            return Err(err);
        }
        if correction.len() < self.num_temps {
            log::warn!("{}", err);
        }

        self.correction.clear();
        self.correction.extend_from_slice(correction);
        self.correction.resize(self.num_temps, 0);
        Ok(())
    }

    /// Apply the offset of channel `idx` to a raw reading
    pub fn corrected(&self, idx: usize, raw: i32) -> Temperature {
        let offset = self.correction.get(idx).copied().unwrap_or(0);
        Temperature::new(raw.saturating_add(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFs;

    fn base(num_temps: usize) -> SensorBase {
        let mut base = SensorBase::new("/proc/acpi/ibm/thermal");
        base.set_num_temps(num_temps);
        base
    }

    #[test]
    fn test_open_checks_readability() {
        let fs = MockFs::new().with_file("/sys/temp1_input", "40000\n");
        assert!(SensorBase::open(&fs, "/sys/temp1_input").is_ok());

        let err = SensorBase::open(&fs, "/sys/temp2_input").unwrap_err();
        assert!(matches!(err, DriverError::Io { .. }));
    }

    #[test]
    fn test_set_num_temps_zero_fills() {
        let base = base(3);
        assert_eq!(base.correction(), &[0, 0, 0]);
    }

    #[test]
    fn test_short_correction_is_padded() {
        let mut base = base(3);
        base.set_correction(&[4]).unwrap();
        assert_eq!(base.correction(), &[4, 0, 0]);
        assert_eq!(base.corrected(2, 50), Temperature::new(50));
    }

    #[test]
    fn test_long_correction_is_rejected() {
        let mut base = base(2);
        let err = base.set_correction(&[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::CorrectionLength {
                len: 3,
                num_temps: 2,
                ..
            }
        ));
        assert_eq!(base.correction(), &[0, 0]);
    }

    #[test]
    fn test_corrected_applies_offset_by_position() {
        let mut base = base(3);
        base.set_correction(&[1, 0, -5]).unwrap();
        assert_eq!(base.corrected(0, 45), Temperature::new(46));
        assert_eq!(base.corrected(1, 50), Temperature::new(50));
        assert_eq!(base.corrected(2, 0), Temperature::new(-5));
    }
}
