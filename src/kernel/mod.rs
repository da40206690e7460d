//! Kernel text interface abstraction
//!
//! Every binding reads and writes procfs/sysfs files through [`ControlFs`],
//! so the driver protocols can run against an in-memory kernel in tests.

pub mod sysfs;
pub mod traits;

pub use sysfs::SysFs;
pub use traits::ControlFs;
