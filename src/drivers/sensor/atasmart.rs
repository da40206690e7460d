//! Hard disk temperatures via S.M.A.R.T.
//!
//! libatasmart is loaded at runtime, so builds with this feature do not
//! need the library installed until a disk sensor is actually configured.

use crate::domain::{Temperature, TemperatureAggregate};
use crate::drivers::sensor::SensorBase;
use crate::drivers::traits::SensorDriver;
use crate::error::DriverError;
use crate::kernel::SysFs;

use libloading::Library;
use std::ffi::CString;
use std::io;
use std::os::raw::{c_char, c_int, c_uint};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr;

const LIBRARY: &str = "libatasmart.so.4";

/// Zero point of the Celsius scale in millikelvin
const ZERO_CELSIUS_MK: i64 = 273_150;

/// Access to one disk's S.M.A.R.T. data
pub trait SmartDisk: Send {
    /// Whether the disk is in a power-saving sleep state
    ///
    /// Must not wake the disk up.
    fn is_sleeping(&self) -> Result<bool, DriverError>;

    /// Current temperature in millikelvin
    fn temperature_millikelvin(&self) -> Result<u64, DriverError>;
}

#[repr(C)]
struct SkDisk {
    _private: [u8; 0],
}

type SkBool = c_uint;
type SkDiskOpenFn = unsafe extern "C" fn(*const c_char, *mut *mut SkDisk) -> c_int;
type SkDiskFreeFn = unsafe extern "C" fn(*mut SkDisk);
type SkDiskCheckSleepModeFn = unsafe extern "C" fn(*mut SkDisk, *mut SkBool) -> c_int;
type SkDiskSmartReadDataFn = unsafe extern "C" fn(*mut SkDisk) -> c_int;
type SkDiskSmartGetTemperatureFn = unsafe extern "C" fn(*mut SkDisk, *mut u64) -> c_int;

/// Disk handle opened through libatasmart
pub struct AtaSmartDisk {
    disk: *mut SkDisk,
    path: PathBuf,
    free: SkDiskFreeFn,
    check_sleep_mode: SkDiskCheckSleepModeFn,
    smart_read_data: SkDiskSmartReadDataFn,
    smart_get_temperature: SkDiskSmartGetTemperatureFn,
    // Keeps the function pointers above valid; dropped after `disk` is freed.
    _lib: Library,
}

// SAFETY: the SkDisk handle is owned exclusively by this struct and only
// touched through `&self` methods of its single owner. The type is not Sync,
// so libatasmart never sees concurrent calls on one handle.
unsafe impl Send for AtaSmartDisk {}

impl AtaSmartDisk {
    /// Load libatasmart and open the disk at `path` (e.g. `/dev/sda`)
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        let path = path.into();

        let lib = unsafe { Library::new(LIBRARY) }
            .map_err(|e| DriverError::System(format!("Failed to load {}: {}", LIBRARY, e)))?;

        let open: SkDiskOpenFn = symbol(&lib, b"sk_disk_open\0")?;
        let free: SkDiskFreeFn = symbol(&lib, b"sk_disk_free\0")?;
        let check_sleep_mode: SkDiskCheckSleepModeFn =
            symbol(&lib, b"sk_disk_check_sleep_mode\0")?;
        let smart_read_data: SkDiskSmartReadDataFn = symbol(&lib, b"sk_disk_smart_read_data\0")?;
        let smart_get_temperature: SkDiskSmartGetTemperatureFn =
            symbol(&lib, b"sk_disk_smart_get_temperature\0")?;

        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            DriverError::System(format!("{}: invalid device path", path.display()))
        })?;

        let mut disk = ptr::null_mut();
        if unsafe { open(c_path.as_ptr(), &mut disk) } < 0 {
            return Err(sk_error("sk_disk_open", &path));
        }

        Ok(Self {
            disk,
            path,
            free,
            check_sleep_mode,
            smart_read_data,
            smart_get_temperature,
            _lib: lib,
        })
    }
}

impl SmartDisk for AtaSmartDisk {
    fn is_sleeping(&self) -> Result<bool, DriverError> {
        let mut awake: SkBool = 1;
        if unsafe { (self.check_sleep_mode)(self.disk, &mut awake) } < 0 {
            return Err(sk_error("sk_disk_check_sleep_mode", &self.path));
        }
        Ok(awake == 0)
    }

    fn temperature_millikelvin(&self) -> Result<u64, DriverError> {
        if unsafe { (self.smart_read_data)(self.disk) } < 0 {
            return Err(sk_error("sk_disk_smart_read_data", &self.path));
        }

        let mut millikelvin = 0u64;
        if unsafe { (self.smart_get_temperature)(self.disk, &mut millikelvin) } < 0 {
            return Err(sk_error("sk_disk_smart_get_temperature", &self.path));
        }
        Ok(millikelvin)
    }
}

impl Drop for AtaSmartDisk {
    fn drop(&mut self) {
        unsafe { (self.free)(self.disk) };
    }
}

impl std::fmt::Debug for AtaSmartDisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtaSmartDisk")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn symbol<T: Copy>(lib: &Library, name: &[u8]) -> Result<T, DriverError> {
    unsafe { lib.get::<T>(name) }
        .map(|sym| *sym)
        .map_err(|e| DriverError::System(format!("Incompatible {}: {}", LIBRARY, e)))
}

fn sk_error(function: &str, path: &Path) -> DriverError {
    let err = io::Error::last_os_error();
    DriverError::System(format!("{}({}): {}", function, path.display(), err))
}

/// Disk temperature sensor
#[derive(Debug)]
pub struct DiskSensor<D: SmartDisk = AtaSmartDisk> {
    base: SensorBase,
    disk: D,
    dnd: bool,
}

impl DiskSensor<AtaSmartDisk> {
    /// Open the disk at `path`
    ///
    /// With `dnd` (do not disturb) set, a sleeping disk is reported as `0`
    /// instead of being woken up by a S.M.A.R.T. query.
    pub fn open(path: impl Into<PathBuf>, dnd: bool) -> Result<Self, DriverError> {
        let base = SensorBase::open(&SysFs, path)?;
        let disk = AtaSmartDisk::open(base.path())?;
        Ok(Self::from_parts(base, disk, dnd))
    }
}

impl<D: SmartDisk> DiskSensor<D> {
    /// Create a sensor over an already opened disk
    pub fn with_disk(path: impl Into<PathBuf>, disk: D, dnd: bool) -> Self {
        Self::from_parts(SensorBase::new(path), disk, dnd)
    }

    fn from_parts(mut base: SensorBase, disk: D, dnd: bool) -> Self {
        base.set_num_temps(1);
        Self { base, disk, dnd }
    }

    fn celsius(&self, millikelvin: u64) -> Result<i32, DriverError> {
        i64::try_from(millikelvin)
            .ok()
            .map(|mk| (mk - ZERO_CELSIUS_MK) / 1000)
            .and_then(|celsius| i32::try_from(celsius).ok())
            .ok_or_else(|| {
                DriverError::System(format!(
                    "Failed to read temperature from {}: {} mK isn't a valid temperature.",
                    self.base.path().display(),
                    millikelvin
                ))
            })
    }
}

impl<D: SmartDisk> SensorDriver for DiskSensor<D> {
    fn base(&self) -> &SensorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SensorBase {
        &mut self.base
    }

    fn read_temps(&self, temps: &mut TemperatureAggregate) -> Result<(), DriverError> {
        if self.dnd && self.disk.is_sleeping()? {
            temps.push(Temperature::new(0));
            return Ok(());
        }

        let celsius = self.celsius(self.disk.temperature_millikelvin()?)?;
        temps.push(self.base.corrected(0, celsius));
        Ok(())
    }
}
