//! Fan and sensor bindings
//!
//! Each binding implements one of the capability traits in [`traits`] for
//! one specific kernel interface.

pub mod fan;
pub mod sensor;
pub mod traits;

pub use fan::{HwmonFan, TpFan};
pub use sensor::{HwmonSensor, SensorBase, TpSensor};
pub use traits::{FanDriver, SensorDriver};

#[cfg(feature = "atasmart")]
pub use sensor::DiskSensor;
#[cfg(feature = "nvml")]
pub use sensor::GpuSensor;
