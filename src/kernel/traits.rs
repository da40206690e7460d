//! Trait definitions for kernel file access

use std::io;
use std::path::Path;

/// Access to kernel-exposed control and status files
///
/// Implementations must not retry or buffer: one call is one open, one
/// read or write, one close, so that the OS error of a failed write reaches
/// the caller unchanged.
pub trait ControlFs: Send {
    /// Check that a path can be opened for reading
    fn probe(&self, path: &Path) -> io::Result<()>;

    /// Read the whole file
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write `data` to an existing file and flush it
    fn write_str(&self, path: &Path, data: &str) -> io::Result<()>;
}
