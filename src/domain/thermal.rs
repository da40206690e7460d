//! Thermal domain types
//!
//! Provides the temperature value type and the per-cycle aggregate that all
//! sensor bindings append to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(i32);

impl Temperature {
    /// Create a new Temperature
    pub const fn new(celsius: i32) -> Self {
        Self(celsius)
    }

    /// Get the temperature in Celsius
    #[inline]
    pub const fn as_celsius(&self) -> i32 {
        self.0
    }

    /// Convert a millidegree reading (hwmon `temp*_input`), truncating
    pub const fn from_millicelsius(millicelsius: i32) -> Self {
        Self(millicelsius / 1000)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C", self.0)
    }
}

impl From<i32> for Temperature {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<Temperature> for i32 {
    fn from(temp: Temperature) -> Self {
        temp.0
    }
}

/// Ordered temperature readings of one polling cycle
///
/// Position `i` always belongs to the same sensor channel: bindings append
/// in registration order and each appends exactly `num_temps()` values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemperatureAggregate {
    temps: Vec<Temperature>,
}

impl TemperatureAggregate {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty aggregate for `capacity` readings
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            temps: Vec::with_capacity(capacity),
        }
    }

    /// Start a new polling cycle
    pub fn clear(&mut self) {
        self.temps.clear();
    }

    /// Append one reading
    pub fn push(&mut self, temp: Temperature) {
        self.temps.push(temp);
    }

    /// Append several readings at once
    pub fn extend<I: IntoIterator<Item = Temperature>>(&mut self, temps: I) {
        self.temps.extend(temps);
    }

    /// Readings in positional order
    pub fn temps(&self) -> &[Temperature] {
        &self.temps
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.temps.len()
    }

    /// Whether nothing was read yet this cycle
    pub fn is_empty(&self) -> bool {
        self.temps.is_empty()
    }

    /// Hottest reading of the cycle
    pub fn max(&self) -> Option<Temperature> {
        self.temps.iter().copied().max()
    }

    /// Iterate in positional order
    pub fn iter(&self) -> impl Iterator<Item = &Temperature> {
        self.temps.iter()
    }
}

impl Index<usize> for TemperatureAggregate {
    type Output = Temperature;

    fn index(&self, index: usize) -> &Self::Output {
        &self.temps[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_display() {
        let temp = Temperature::new(65);
        assert_eq!(temp.to_string(), "65°C");
    }

    #[test]
    fn test_from_millicelsius_truncates() {
        assert_eq!(Temperature::from_millicelsius(43999).as_celsius(), 43);
        assert_eq!(Temperature::from_millicelsius(-1500).as_celsius(), -1);
    }

    #[test]
    fn test_aggregate_keeps_order() {
        let mut temps = TemperatureAggregate::new();
        temps.push(Temperature::new(50));
        temps.extend([Temperature::new(40), Temperature::new(60)]);

        let celsius: Vec<i32> = temps.iter().map(|t| t.as_celsius()).collect();
        assert_eq!(celsius, vec![50, 40, 60]);
        assert_eq!(temps[2], Temperature::new(60));
        assert_eq!(temps.max(), Some(Temperature::new(60)));
    }

    #[test]
    fn test_aggregate_clear() {
        let mut temps = TemperatureAggregate::with_capacity(2);
        temps.push(Temperature::new(50));
        temps.clear();
        assert!(temps.is_empty());
        assert_eq!(temps.max(), None);
    }
}
