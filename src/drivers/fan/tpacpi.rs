//! thinkpad_acpi fan binding
//!
//! Controls the fan through the text protocol of `/proc/acpi/ibm/fan`.
//! The kernel driver falls back to BIOS control when it is not written to
//! within its watchdog timeout, so the binding either re-sends the current
//! level every cycle or, when depulsing is configured, briefly disengages
//! the fan before every write.

use crate::domain::Level;
use crate::drivers::fan::write_level;
use crate::drivers::traits::FanDriver;
use crate::error::DriverError;
use crate::kernel::{ControlFs, SysFs};

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Default thinkpad_acpi fan path
pub const DEFAULT_PATH: &str = "/proc/acpi/ibm/fan";
/// Default kernel watchdog timeout
pub const DEFAULT_WATCHDOG: Duration = Duration::from_secs(120);
/// Default polling period
pub const DEFAULT_SLEEPTIME: Duration = Duration::from_secs(5);

const CONTROL_SUPPORTED: &str = "level <level>";

/// Fan controlled via thinkpad_acpi
#[derive(Debug)]
pub struct TpFan<F: ControlFs = SysFs> {
    fs: F,
    path: PathBuf,
    initial_level: String,
    watchdog: Duration,
    depulse: Duration,
    sleeptime: Duration,
    last_write: Option<Instant>,
    restored: bool,
}

impl TpFan<SysFs> {
    /// Open the thinkpad_acpi fan at `path`
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        Self::with_fs(SysFs, path)
    }
}

impl<F: ControlFs> TpFan<F> {
    /// Open the fan through a specific [`ControlFs`]
    ///
    /// # Errors
    /// - [`DriverError::Io`] if the status cannot be read
    /// - [`DriverError::System`] if the module was loaded without
    ///   `fan_control=1` or the status has no `level:` line
    pub fn with_fs(fs: F, path: impl Into<PathBuf>) -> Result<Self, DriverError> {
        let path = path.into();
        let status = fs.read_to_string(&path).map_err(|e| {
            DriverError::io(format!("Initializing fan control via {}", path.display()), e)
        })?;

        let mut initial_level = None;
        let mut ctrl_supported = false;
        for line in status.lines() {
            if line.contains("level:") {
                initial_level = line.split_whitespace().last().map(str::to_string);
            } else if line.contains("commands:") && line.contains(CONTROL_SUPPORTED) {
                ctrl_supported = true;
            }
        }

        if !ctrl_supported {
            return Err(DriverError::System(format!(
                "{}: fan control is not supported. Load thinkpad_acpi with fan_control=1",
                path.display()
            )));
        }
        let initial_level = initial_level.ok_or_else(|| {
            DriverError::System(format!("{}: Unknown file format.", path.display()))
        })?;

        log::debug!(
            "thinkpad_acpi fan at {} starts at level {}",
            path.display(),
            initial_level
        );

        Ok(Self {
            fs,
            path,
            initial_level,
            watchdog: DEFAULT_WATCHDOG,
            depulse: Duration::ZERO,
            sleeptime: DEFAULT_SLEEPTIME,
            last_write: None,
            restored: false,
        })
    }

    /// Builder: kernel watchdog timeout (zero disables it)
    pub fn with_watchdog(mut self, watchdog: Duration) -> Self {
        self.watchdog = watchdog;
        self
    }

    /// Builder: depulse duration (zero disables depulsing)
    pub fn with_depulse(mut self, depulse: Duration) -> Self {
        self.depulse = depulse;
        self
    }

    /// Builder: polling period, used as slack on the watchdog deadline
    pub fn with_sleeptime(mut self, sleeptime: Duration) -> Self {
        self.sleeptime = sleeptime;
        self
    }

    /// Level found at construction, written back on restore
    pub fn initial_level(&self) -> &str {
        &self.initial_level
    }

    /// Kernel watchdog timeout armed by `init`
    pub fn watchdog(&self) -> Duration {
        self.watchdog
    }

    /// Time the fan is disengaged before each write
    pub fn depulse(&self) -> Duration {
        self.depulse
    }

    fn watchdog_due(&self, now: Instant) -> bool {
        self.last_write
            .is_some_and(|last| last + self.watchdog + self.sleeptime >= now)
    }
}

impl<F: ControlFs> FanDriver for TpFan<F> {
    fn path(&self) -> &Path {
        &self.path
    }

    fn init(&mut self) -> Result<(), DriverError> {
        self.fs
            .write_str(&self.path, &format!("watchdog {}", self.watchdog.as_secs()))
            .map_err(|e| {
                DriverError::io(
                    format!("Initializing fan control via {}", self.path.display()),
                    e,
                )
            })
    }

    fn set_speed(&mut self, level: &Level) -> Result<(), DriverError> {
        write_level(&self.fs, &self.path, level.as_text())?;
        self.last_write = Some(Instant::now());
        Ok(())
    }

    fn ping_watchdog_and_depulse(&mut self, level: &Level) -> Result<(), DriverError> {
        if !self.depulse.is_zero() {
            write_level(&self.fs, &self.path, Level::disengaged().as_text())?;
            thread::sleep(self.depulse);
            self.set_speed(level)
        } else if self.watchdog_due(Instant::now()) {
            self.set_speed(level)
        } else {
            Ok(())
        }
    }

    fn restore(&mut self) -> Result<(), DriverError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        let level = format!("{}{}", Level::PREFIX, self.initial_level);
        self.fs.write_str(&self.path, &level).map_err(|e| {
            DriverError::io(
                format!("Resetting fan control via {}", self.path.display()),
                e,
            )
        })
    }
}

impl<F: ControlFs> Drop for TpFan<F> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFs, EIO};

    const PATH: &str = "/proc/acpi/ibm/fan";

    const STATUS: &str = "status:\t\tenabled\n\
                          speed:\t\t2650\n\
                          level:\t\tauto\n\
                          commands:\tlevel <level> (<level> is 0-7, auto, disengaged, full-speed)\n\
                          commands:\tenable, disable\n\
                          commands:\twatchdog <timeout> (<timeout> is 0 (off), 1-120 (seconds))\n";

    const STATUS_NO_CONTROL: &str = "status:\t\tenabled\n\
                                     speed:\t\t2650\n\
                                     level:\t\tauto\n";

    fn fan(fs: &MockFs) -> TpFan<MockFs> {
        TpFan::with_fs(fs.clone(), PATH).unwrap()
    }

    #[test]
    fn test_reads_initial_level() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let fan = fan(&fs);
        assert_eq!(fan.initial_level(), "auto");
        assert_eq!(fan.watchdog(), DEFAULT_WATCHDOG);
        assert!(fan.depulse().is_zero());
    }

    #[test]
    fn test_construction_fails_without_control_support() {
        let fs = MockFs::new().with_file(PATH, STATUS_NO_CONTROL);
        let err = TpFan::with_fs(fs.clone(), PATH).unwrap_err();
        assert!(matches!(err, DriverError::System(ref msg) if msg.contains("fan_control=1")));
        // A binding that never existed has nothing to restore.
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn test_construction_requires_exact_command_token() {
        let status = STATUS.replace("level <level>", "level <lvl>");
        let fs = MockFs::new().with_file(PATH, status);
        assert!(matches!(
            TpFan::with_fs(fs.clone(), PATH),
            Err(DriverError::System(_))
        ));
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn test_construction_read_failure_is_io_error() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        fs.fail_reads(PATH, EIO);
        let err = TpFan::with_fs(fs, PATH).unwrap_err();
        assert_eq!(err.code(), Some(EIO));
    }

    #[test]
    fn test_init_writes_watchdog() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let mut fan = fan(&fs).with_watchdog(Duration::from_secs(30));
        fan.init().unwrap();
        assert_eq!(fs.writes_to(PATH)[0], "watchdog 30");
    }

    #[test]
    fn test_init_failure_is_io_error() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        fs.fail_next_write(PATH, EIO);
        let mut fan = fan(&fs);
        assert!(matches!(fan.init(), Err(DriverError::Io { .. })));
    }

    #[test]
    fn test_set_speed_writes_level_text() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let mut fan = fan(&fs);
        fan.set_speed(&Level::numeric(7)).unwrap();
        fan.set_speed(&Level::named("full-speed")).unwrap();
        assert_eq!(fs.writes_to(PATH)[..2], ["level 7", "level full-speed"]);
    }

    #[test]
    fn test_watchdog_ping_after_successful_write() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let mut fan = fan(&fs);
        let level = Level::numeric(3);

        fan.set_speed(&level).unwrap();
        fan.ping_watchdog_and_depulse(&level).unwrap();
        assert_eq!(fs.writes_to(PATH)[..2], ["level 3", "level 3"]);
        assert!(!fs.writes_to(PATH).contains(&"level disengaged".to_string()));
    }

    #[test]
    fn test_watchdog_deadline() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let mut fan = fan(&fs);
        fan.set_speed(&Level::numeric(3)).unwrap();

        let deadline = fan.last_write.unwrap() + fan.watchdog + fan.sleeptime;
        assert!(fan.watchdog_due(deadline));
        assert!(!fan.watchdog_due(deadline + Duration::from_millis(1)));
        assert!(!fan.watchdog_due(Instant::now() + Duration::from_secs(1000)));
    }

    #[test]
    fn test_no_watchdog_ping_before_first_write() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let mut fan = fan(&fs);
        fan.ping_watchdog_and_depulse(&Level::numeric(3)).unwrap();
        assert!(fs.writes().is_empty());
        drop(fan);
    }

    #[test]
    fn test_no_watchdog_ping_after_failed_write() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        fs.fail_next_write(PATH, EIO);
        let mut fan = fan(&fs);
        let level = Level::numeric(3);

        assert!(fan.set_speed(&level).is_err());
        fan.ping_watchdog_and_depulse(&level).unwrap();
        assert_eq!(fs.writes_to(PATH).len(), 1);
    }

    #[test]
    fn test_depulse_disengages_before_every_write() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let mut fan = fan(&fs).with_depulse(Duration::from_millis(1));
        let level = Level::numeric(2);

        // No prior write: the watchdog path would do nothing, depulse still runs.
        fan.ping_watchdog_and_depulse(&level).unwrap();
        fan.ping_watchdog_and_depulse(&level).unwrap();
        assert_eq!(
            fs.writes_to(PATH)[..4],
            ["level disengaged", "level 2", "level disengaged", "level 2"]
        );
    }

    #[test]
    fn test_depulse_failure_propagates() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        fs.fail_next_write(PATH, EIO);
        let mut fan = fan(&fs).with_depulse(Duration::from_millis(1));

        assert!(fan.ping_watchdog_and_depulse(&Level::numeric(2)).is_err());
        assert_eq!(fs.writes_to(PATH), vec!["level disengaged"]);
    }

    #[test]
    fn test_restore_writes_initial_level_once() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let mut fan = fan(&fs);
        fan.set_speed(&Level::numeric(5)).unwrap();

        fan.restore().unwrap();
        fan.restore().unwrap();
        drop(fan);

        let writes = fs.writes_to(PATH);
        assert_eq!(writes, vec!["level 5", "level auto"]);
    }

    #[test]
    fn test_drop_restores_after_failed_set_speed() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        fs.fail_next_write(PATH, EIO);
        let mut fan = fan(&fs);

        assert!(fan.set_speed(&Level::numeric(5)).is_err());
        drop(fan);

        let writes = fs.writes_to(PATH);
        assert_eq!(writes.iter().filter(|w| *w == "level auto").count(), 1);
        assert_eq!(writes.last().map(String::as_str), Some("level auto"));
    }

    #[test]
    fn test_restore_failure_is_reported_once() {
        let fs = MockFs::new().with_file(PATH, STATUS);
        let mut fan = fan(&fs);
        fs.fail_next_write(PATH, EIO);

        let err = fan.restore().unwrap_err();
        assert_eq!(err.code(), Some(EIO));

        // Drop must not write a second time.
        drop(fan);
        assert_eq!(fs.writes_to(PATH), vec!["level auto"]);
    }
}
