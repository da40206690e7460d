//! fanctl - fan and temperature sensor control library
//!
//! This library provides the hardware abstraction layer of a fan control
//! daemon: temperature sensors and fan controllers exposed by the kernel
//! (hwmon, thinkpad_acpi), hard disks via S.M.A.R.T. and NVIDIA GPUs via
//! NVML, behind two capability traits.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Levels and temperatures
//! - [`drivers`]: Fan and sensor bindings
//! - [`error`]: Error types
//! - [`kernel`]: Access to kernel text interfaces
//! - [`services`]: Bindings registry

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod drivers;
pub mod error;
pub mod kernel;
pub mod services;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
