//! sysfs hwmon PWM fan binding

use crate::domain::Level;
use crate::drivers::fan::write_level;
use crate::drivers::traits::FanDriver;
use crate::error::{ConfigError, DriverError};
use crate::kernel::{ControlFs, SysFs};

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Highest duty cycle accepted by `pwmN`
pub const PWM_MAX: u32 = 255;

const MANUAL_MODE: &str = "1";

/// PWM fan controlled via `pwmN` / `pwmN_enable`
#[derive(Debug)]
pub struct HwmonFan<F: ControlFs = SysFs> {
    fs: F,
    path: PathBuf,
    enable_path: PathBuf,
    initial_enable: String,
    restored: bool,
}

impl HwmonFan<SysFs> {
    /// Open the PWM fan at `path`
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        Self::with_fs(SysFs, path)
    }
}

impl<F: ControlFs> HwmonFan<F> {
    /// Open the fan through a specific [`ControlFs`]
    ///
    /// Remembers the current `pwmN_enable` mode to restore it later.
    pub fn with_fs(fs: F, path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        let path = path.into();
        let enable_path = enable_path(&path);

        let initial_enable = fs
            .read_to_string(&enable_path)
            .map_err(|e| {
                DriverError::io(format!("Initializing PWM fan {}", path.display()), e)
            })?
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        log::debug!(
            "PWM fan at {} starts in mode {}",
            path.display(),
            initial_enable
        );

        Ok(Self {
            fs,
            path,
            enable_path,
            initial_enable,
            restored: false,
        })
    }

    /// Sibling `pwmN_enable` path
    pub fn enable_path(&self) -> &Path {
        &self.enable_path
    }

    /// `pwmN_enable` value found at construction
    pub fn initial_enable(&self) -> &str {
        &self.initial_enable
    }

    fn duty_cycle(level: &Level) -> Result<String, ConfigError> {
        match level.as_numeric() {
            Some(value) if value <= PWM_MAX => Ok(value.to_string()),
            Some(_) => Err(ConfigError::InvalidLevel {
                level: level.to_string(),
                reason: format!("PWM duty cycle must be 0-{}", PWM_MAX),
            }),
            None => Err(ConfigError::InvalidLevel {
                level: level.to_string(),
                reason: "PWM fans need a numeric level".to_string(),
            }),
        }
    }
}

impl<F: ControlFs> FanDriver for HwmonFan<F> {
    fn path(&self) -> &Path {
        &self.path
    }

    fn init(&mut self) -> Result<(), DriverError> {
        self.fs
            .write_str(&self.enable_path, MANUAL_MODE)
            .map_err(|e| {
                DriverError::io(format!("Initializing PWM fan {}", self.path.display()), e)
            })
    }

    fn set_speed(&mut self, level: &Level) -> Result<(), DriverError> {
        let duty = Self::duty_cycle(level)?;

        match write_level(&self.fs, &self.path, &duty) {
            // The kernel resets PWM channels to automatic mode on resume;
            // writing a duty cycle then fails with EINVAL.
            Err(e) if e.kind() == Some(ErrorKind::InvalidInput) => {
                self.init()?;
                write_level(&self.fs, &self.path, &duty)?;
                log::debug!(
                    "It seems we woke up from suspend. PWM fan driver {} had to be re-initialized.",
                    self.path.display()
                );
                Ok(())
            }
            other => other,
        }
    }

    fn restore(&mut self) -> Result<(), DriverError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        self.fs
            .write_str(&self.enable_path, &self.initial_enable)
            .map_err(|e| {
                DriverError::io(format!("Resetting PWM fan {}", self.path.display()), e)
            })
    }
}

impl<F: ControlFs> Drop for HwmonFan<F> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("{}", e);
        }
    }
}

fn enable_path(path: &Path) -> PathBuf {
    let mut enable: OsString = path.as_os_str().to_owned();
    enable.push("_enable");
    PathBuf::from(enable)
}
