//! Service layer
//!
//! Owns the bindings built from the configuration and exposes the
//! per-cycle operations the decision policy drives.

pub mod bindings;

pub use bindings::Bindings;
