//! Clock periods with unit parsing, as written into SDC constraints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A clock period stored in nanoseconds.
///
/// Parses `"100ns"`, `"2.5ns"`, `"1us"`, `"500ps"`, frequencies such as
/// `"10MHz"` (converted to their period), and bare numbers (nanoseconds, the
/// SDC default time unit).
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ClockPeriod(f64);

impl ClockPeriod {
    /// Creates a period from a value in nanoseconds.
    pub fn from_ns(ns: f64) -> Self {
        Self(ns)
    }

    /// Returns the period in nanoseconds.
    pub fn ns(&self) -> f64 {
        self.0
    }

    /// Returns the matching frequency in megahertz.
    pub fn mhz(&self) -> f64 {
        1_000.0 / self.0
    }
}

impl fmt::Debug for ClockPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockPeriod({self})")
    }
}

impl fmt::Display for ClockPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// Error returned when a period string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock period: '{input}'")]
pub struct ParsePeriodError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for ClockPeriod {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParsePeriodError {
            input: s.to_string(),
        };
        let number = |text: &str| -> Result<f64, ParsePeriodError> {
            let val: f64 = text.trim().parse().map_err(|_| err())?;
            if val.is_finite() && val > 0.0 {
                Ok(val)
            } else {
                Err(err())
            }
        };

        let lower = s.to_ascii_lowercase();
        // Frequencies first: "mhz" also ends in "hz", and "ns" must not swallow them.
        if let Some(num) = lower.strip_suffix("ghz") {
            return Ok(ClockPeriod(1.0 / number(num)?));
        }
        if let Some(num) = lower.strip_suffix("mhz") {
            return Ok(ClockPeriod(1_000.0 / number(num)?));
        }
        if let Some(num) = lower.strip_suffix("khz") {
            return Ok(ClockPeriod(1_000_000.0 / number(num)?));
        }
        if let Some(num) = lower.strip_suffix("ps") {
            return Ok(ClockPeriod(number(num)? / 1_000.0));
        }
        if let Some(num) = lower.strip_suffix("ns") {
            return Ok(ClockPeriod(number(num)?));
        }
        if let Some(num) = lower.strip_suffix("us") {
            return Ok(ClockPeriod(number(num)? * 1_000.0));
        }
        if let Some(num) = lower.strip_suffix("ms") {
            return Ok(ClockPeriod(number(num)? * 1_000_000.0));
        }

        Ok(ClockPeriod(number(s)?))
    }
}
