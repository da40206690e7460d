//! Fan level value type
//!
//! A [`Level`] is what the decision policy asks a fan binding to execute.
//! Text-protocol fans (thinkpad_acpi) write its text form, PWM fans write its
//! numeric form.

use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Requested fan speed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Level {
    text: String,
    numeric: Option<u32>,
}

impl Level {
    /// Prefix of every thinkpad_acpi level command
    pub const PREFIX: &'static str = "level ";

    /// Create a numeric level, e.g. `7` (`level 7`) or a PWM duty cycle
    pub fn numeric(value: u32) -> Self {
        Self {
            text: format!("{}{}", Self::PREFIX, value),
            numeric: Some(value),
        }
    }

    /// Create a named level, e.g. `auto`, `full-speed` or `disengaged`
    ///
    /// A name that already carries the `level ` prefix is taken verbatim.
    pub fn named(name: &str) -> Self {
        let text = if name.starts_with(Self::PREFIX) {
            name.to_string()
        } else {
            format!("{}{}", Self::PREFIX, name)
        };
        let numeric = text[Self::PREFIX.len()..].trim().parse().ok();
        Self { text, numeric }
    }

    /// Full speed, ignoring the fan's maximum RPM
    pub fn disengaged() -> Self {
        Self::named("disengaged")
    }

    /// Text written to text-protocol fan controllers
    #[inline]
    pub fn as_text(&self) -> &str {
        &self.text
    }

    /// Numeric value written to PWM controllers, if the level has one
    #[inline]
    pub fn as_numeric(&self) -> Option<u32> {
        self.numeric
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Level {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u32>() {
            Ok(value) => Self::numeric(value),
            Err(_) => Self::named(s),
        })
    }
}
