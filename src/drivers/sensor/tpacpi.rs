//! thinkpad_acpi temperature binding
//!
//! `/proc/acpi/ibm/thermal` looks like
//!
//! ```text
//! temperatures:   45 50 0 0 36 -128 33 -128
//! ```
//!
//! with one integer per channel. Unused channels report `0` or `-128` and
//! are still counted, so positions stay stable across reads.

use crate::domain::TemperatureAggregate;
use crate::drivers::sensor::SensorBase;
use crate::drivers::traits::SensorDriver;
use crate::error::DriverError;
use crate::kernel::{ControlFs, SysFs};

use std::io;
use std::path::PathBuf;

/// Default thinkpad_acpi thermal path
pub const DEFAULT_PATH: &str = "/proc/acpi/ibm/thermal";

const PREFIX: &str = "temperatures:";

/// Multi-channel thinkpad_acpi sensor
#[derive(Debug)]
pub struct TpSensor<F: ControlFs = SysFs> {
    fs: F,
    base: SensorBase,
    skip_bytes: usize,
}

impl TpSensor<SysFs> {
    /// Open the thinkpad_acpi sensor file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        Self::with_fs(SysFs, path)
    }
}

impl<F: ControlFs> TpSensor<F> {
    /// Open the sensor through a specific [`ControlFs`]
    ///
    /// # Errors
    /// - [`DriverError::Io`] if the file cannot be read
    /// - [`DriverError::System`] if it does not start with `temperatures:`
    pub fn with_fs(fs: F, path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        let mut base = SensorBase::open(&fs, path)?;
        let content = fs.read_to_string(base.path()).map_err(|e| {
            DriverError::io(format!("Initializing sensor {}", base.path().display()), e)
        })?;

        if !content.starts_with(PREFIX) {
            return Err(DriverError::System(format!(
                "{}: Unknown file format.",
                base.path().display()
            )));
        }
        let skip_bytes = PREFIX.len();

        let count = parse_channels(&content[skip_bytes..]).count();
        base.set_num_temps(count);

        log::debug!(
            "thinkpad_acpi sensor {} has {} channels",
            base.path().display(),
            count
        );

        Ok(Self {
            fs,
            base,
            skip_bytes,
        })
    }

    fn read_channels(&self) -> io::Result<Vec<i32>> {
        let content = self.fs.read_to_string(self.base.path())?;
        let values = content
            .get(self.skip_bytes..)
            .map(|rest| parse_channels(rest).collect::<Vec<_>>())
            .unwrap_or_default();

        if values.len() != self.base.num_temps() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "expected {} temperatures, found {}",
                    self.base.num_temps(),
                    values.len()
                ),
            ));
        }
        Ok(values)
    }
}

impl<F: ControlFs> SensorDriver for TpSensor<F> {
    fn base(&self) -> &SensorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SensorBase {
        &mut self.base
    }

    fn read_temps(&self, temps: &mut TemperatureAggregate) -> Result<(), DriverError> {
        let values = self.read_channels().map_err(|e| {
            DriverError::io(
                format!("Failed to read temperature(s) from {}", self.base.path().display()),
                e,
            )
        })?;

        temps.extend(
            values
                .into_iter()
                .enumerate()
                .map(|(idx, raw)| self.base.corrected(idx, raw)),
        );
        Ok(())
    }
}

/// Whitespace-separated integers up to the first token that is not one
fn parse_channels(input: &str) -> impl Iterator<Item = i32> + '_ {
    input
        .split_whitespace()
        .map_while(|token| token.parse::<i32>().ok())
}
