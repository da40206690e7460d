//! Real kernel file access

use crate::kernel::traits::ControlFs;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// [`ControlFs`] backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct SysFs;

impl ControlFs for SysFs {
    fn probe(&self, path: &Path) -> io::Result<()> {
        File::open(path).map(drop)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_str(&self, path: &Path, data: &str) -> io::Result<()> {
        // Never create: a missing control file means a wrong path.
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
        file.write_all(data.as_bytes())?;
        file.flush()
    }
}
