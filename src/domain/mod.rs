//! Domain models for fanctl
//!
//! Value types exchanged between the driver layer and the decision policy.

pub mod level;
pub mod thermal;

pub use level::Level;
pub use thermal::{Temperature, TemperatureAggregate};
