//! Unified error types for fanctl
//!
//! Driver errors are classified the way the daemon needs to react to them:
//! [`DriverError::Io`] for OS-level failures on a single path (carrying the
//! OS error so callers can match on it), [`DriverError::System`] for an
//! environment that cannot support the binding at all, and
//! [`DriverError::Config`] for caller-supplied values that break an
//! invariant before anything is written to hardware.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a fan or sensor binding
    #[error("{0}")]
    Driver(#[from] DriverError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No sensors configured
    #[error("No sensors configured")]
    NoSensors,

    /// No fan configured
    #[error("No fan configured")]
    NoFan,

    /// Signal handler could not be installed
    #[error("Failed to set signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    /// IO error (stdout, config files)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by fan and sensor bindings
#[derive(Error, Debug)]
pub enum DriverError {
    /// I/O failure on a kernel interface
    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },

    /// The environment does not support this binding
    #[error("{0}")]
    System(String),

    /// A caller-supplied value violates a structural invariant
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
}

impl DriverError {
    /// Wrap an I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Raw OS error code of an I/O failure, if any
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// Kind of the underlying I/O failure, if any
    pub fn kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Correction vector does not fit the sensor
    #[error("{path}: {len} correction values given for {num_temps} temperatures")]
    CorrectionLength {
        path: PathBuf,
        len: usize,
        num_temps: usize,
    },

    /// Level cannot be executed by this fan binding
    #[error("Invalid fan level '{level}': {reason}")]
    InvalidLevel { level: String, reason: String },

    /// Binding type not compiled into this build
    #[error("{0} support was not enabled at build time")]
    Unsupported(String),

    /// A second fan was configured
    #[error("Only one fan can be controlled, {0} is already configured")]
    DuplicateFan(PathBuf),

    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_os_code() {
        let err = DriverError::io("write failed", io::Error::from_raw_os_error(22));
        assert_eq!(err.code(), Some(22));
        assert_eq!(err.kind(), Some(io::ErrorKind::InvalidInput));
        assert!(err.to_string().starts_with("write failed: "));
    }

    #[test]
    fn test_system_error_has_no_code() {
        let err = DriverError::System("no fan control".to_string());
        assert_eq!(err.code(), None);
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_correction_length_display() {
        let err = ConfigError::CorrectionLength {
            path: PathBuf::from("/proc/acpi/ibm/thermal"),
            len: 4,
            num_temps: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("/proc/acpi/ibm/thermal"));
        assert!(msg.contains("4 correction values"));
        assert!(msg.contains("3 temperatures"));
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::Unsupported("NVML".to_string());
        let driver_err: DriverError = config_err.into();
        assert!(matches!(driver_err, DriverError::Config(_)));

        let app_err: AppError = driver_err.into();
        assert!(matches!(app_err, AppError::Driver(DriverError::Config(_))));
    }
}
