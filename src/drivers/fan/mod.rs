//! Fan bindings
//!
//! - [`TpFan`]: thinkpad_acpi, typically `/proc/acpi/ibm/fan`
//! - [`HwmonFan`]: PWM fans in sysfs, e.g. `/sys/class/hwmon/hwmon2/pwm1`

pub mod hwmon;
pub mod tpacpi;

pub use hwmon::HwmonFan;
pub use tpacpi::TpFan;

use crate::error::DriverError;
use crate::kernel::ControlFs;

use std::io::ErrorKind;
use std::path::Path;

/// Write a literal speed command to a fan control path
///
/// Permission problems are not transient and become
/// [`DriverError::System`]. Everything else is an [`DriverError::Io`] that
/// keeps the OS error for the caller to inspect.
pub fn write_level<F: ControlFs>(fs: &F, path: &Path, text: &str) -> Result<(), DriverError> {
    fs.write_str(path, text).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => DriverError::System(format!(
            "Permission denied when writing to {}. Are you running as root?",
            path.display()
        )),
        _ => DriverError::io(
            format!("Setting fan speed to '{}' via {}", text, path.display()),
            e,
        ),
    })
}
