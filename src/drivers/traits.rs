//! Capability traits for fan and sensor bindings
//!
//! The decision policy only ever sees these two traits. Which concrete
//! binding sits behind them is decided once, when the bindings are built
//! from the configuration.

use crate::domain::{Level, TemperatureAggregate};
use crate::drivers::sensor::SensorBase;
use crate::error::{ConfigError, DriverError};

use std::path::Path;

/// A fan controller
///
/// A binding owns its control path exclusively. Whatever state the hardware
/// was in when the binding was constructed is written back by
/// [`restore`](FanDriver::restore), or by `Drop` if `restore` was never
/// called.
pub trait FanDriver: Send {
    /// Control path of this fan
    fn path(&self) -> &Path;

    /// Take over control (enable manual mode, arm the watchdog)
    fn init(&mut self) -> Result<(), DriverError>;

    /// Execute a speed change
    fn set_speed(&mut self, level: &Level) -> Result<(), DriverError>;

    /// Keep manual control alive for the currently active level
    ///
    /// Called once per polling period. Bindings without a kernel watchdog
    /// do nothing.
    fn ping_watchdog_and_depulse(&mut self, _level: &Level) -> Result<(), DriverError> {
        Ok(())
    }

    /// Write the initial hardware state back
    ///
    /// The write is attempted exactly once per binding, regardless of earlier
    /// failures. Later calls return `Ok(())` without touching the hardware.
    fn restore(&mut self) -> Result<(), DriverError>;
}

/// A temperature source
///
/// Shared bookkeeping (path, channel count, correction) lives in
/// [`SensorBase`]; implementors only provide access to it and `read_temps`.
pub trait SensorDriver: Send {
    /// Shared sensor state
    fn base(&self) -> &SensorBase;

    /// Shared sensor state, mutably
    fn base_mut(&mut self) -> &mut SensorBase;

    /// Append exactly `num_temps()` corrected readings
    ///
    /// On error nothing is appended.
    fn read_temps(&self, temps: &mut TemperatureAggregate) -> Result<(), DriverError>;

    /// Path, device or bus id this sensor reads from
    fn path(&self) -> &Path {
        self.base().path()
    }

    /// Number of temperatures one `read_temps` call produces
    fn num_temps(&self) -> usize {
        self.base().num_temps()
    }

    /// Set per-channel correction offsets
    fn set_correction(&mut self, correction: &[i32]) -> Result<(), ConfigError> {
        self.base_mut().set_correction(correction)
    }
}
