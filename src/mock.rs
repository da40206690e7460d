//! Mock implementations for testing
//!
//! Provides an in-memory kernel for the fan and sensor protocols, plus mock
//! disk and GPU backends for the optional bindings.

use crate::kernel::ControlFs;

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Linux errno values used to inject kernel failures
pub const EIO: i32 = 5;
pub const EACCES: i32 = 13;
pub const EINVAL: i32 = 22;

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<PathBuf, String>,
    writes: Vec<(PathBuf, String)>,
    failures: HashMap<PathBuf, VecDeque<i32>>,
    read_failures: HashMap<PathBuf, i32>,
}

/// In-memory kernel files
///
/// Clones share state, so a test can keep a handle while a binding owns
/// another one. Every write attempt is logged, including failed ones.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    state: Arc<Mutex<MockState>>,
}

impl MockFs {
    /// Create an empty mock kernel
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a file
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.into(), content.into());
        self
    }

    /// Let the next write to `path` fail with OS error `errno`
    ///
    /// Calls queue up: two calls make two consecutive writes fail.
    pub fn fail_next_write(&self, path: impl Into<PathBuf>, errno: i32) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(path.into())
            .or_default()
            .push_back(errno);
    }

    /// Let every read of `path` fail with OS error `errno`
    pub fn fail_reads(&self, path: impl Into<PathBuf>, errno: i32) {
        self.state
            .lock()
            .unwrap()
            .read_failures
            .insert(path.into(), errno);
    }

    /// Replace the content of a file
    pub fn set_content(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.into(), content.into());
    }

    /// Current content of a file
    pub fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state.lock().unwrap().files.get(path.as_ref()).cloned()
    }

    /// All write attempts in order
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Write attempts to one path in order
    pub fn writes_to(&self, path: impl AsRef<Path>) -> Vec<String> {
        let path = path.as_ref();
        self.state
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, data)| data.clone())
            .collect()
    }
}

impl ControlFs for MockFs {
    fn probe(&self, path: &Path) -> io::Result<()> {
        self.read_to_string(path).map(drop)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self.state.lock().unwrap();
        if let Some(&errno) = state.read_failures.get(path) {
            return Err(io::Error::from_raw_os_error(errno));
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn write_str(&self, path: &Path, data: &str) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.writes.push((path.to_path_buf(), data.to_string()));

        if let Some(errno) = state.failures.get_mut(path).and_then(VecDeque::pop_front) {
            return Err(io::Error::from_raw_os_error(errno));
        }
        if !state.files.contains_key(path) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        state.files.insert(path.to_path_buf(), data.to_string());
        Ok(())
    }
}

/// Mock S.M.A.R.T. disk
#[cfg(feature = "atasmart")]
#[derive(Debug, Clone)]
pub struct MockDisk {
    pub sleeping: bool,
    pub millikelvin: u64,
    pub smart_queries: Arc<Mutex<u32>>,
}

#[cfg(feature = "atasmart")]
impl MockDisk {
    /// An awake disk at the given temperature
    pub fn new(millikelvin: u64) -> Self {
        Self {
            sleeping: false,
            millikelvin,
            smart_queries: Arc::new(Mutex::new(0)),
        }
    }

    /// Builder: put the disk to sleep
    pub fn sleeping(mut self) -> Self {
        self.sleeping = true;
        self
    }

    /// Number of S.M.A.R.T. temperature queries so far
    pub fn queries(&self) -> u32 {
        *self.smart_queries.lock().unwrap()
    }
}

#[cfg(feature = "atasmart")]
impl crate::drivers::sensor::atasmart::SmartDisk for MockDisk {
    fn is_sleeping(&self) -> Result<bool, crate::error::DriverError> {
        Ok(self.sleeping)
    }

    fn temperature_millikelvin(&self) -> Result<u64, crate::error::DriverError> {
        *self.smart_queries.lock().unwrap() += 1;
        Ok(self.millikelvin)
    }
}

/// Mock NVML GPU
#[cfg(feature = "nvml")]
#[derive(Debug, Clone)]
pub struct MockGpu {
    pub celsius: u32,
    pub fail: bool,
}

#[cfg(feature = "nvml")]
impl MockGpu {
    /// A GPU at the given temperature
    pub fn new(celsius: u32) -> Self {
        Self {
            celsius,
            fail: false,
        }
    }

    /// Builder: make temperature queries fail
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[cfg(feature = "nvml")]
impl crate::drivers::sensor::nvml::GpuThermal for MockGpu {
    fn temperature(&self) -> Result<u32, crate::error::DriverError> {
        if self.fail {
            return Err(crate::error::DriverError::System(
                "Failed to read GPU temperature. Error code (cf. nvml.h): 15".to_string(),
            ));
        }
        Ok(self.celsius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_write_log_and_failures() {
        let fs = MockFs::new().with_file("/sys/pwm1", "0");
        fs.fail_next_write("/sys/pwm1", EINVAL);

        let err = fs.write_str(Path::new("/sys/pwm1"), "100").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(fs.content("/sys/pwm1").as_deref(), Some("0"));

        fs.write_str(Path::new("/sys/pwm1"), "100").unwrap();
        assert_eq!(fs.content("/sys/pwm1").as_deref(), Some("100"));
        assert_eq!(fs.writes_to("/sys/pwm1"), vec!["100", "100"]);
    }

    #[test]
    fn test_mock_missing_file() {
        let fs = MockFs::new();
        assert!(fs.read_to_string(Path::new("/nope")).is_err());
        assert!(fs.write_str(Path::new("/nope"), "1").is_err());
    }
}
