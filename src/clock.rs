//! Clock-style durations (`H:MM:SS`) as used for SABnzbd's `timeleft` fields.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

use crate::decode::json_type;
use crate::error::DurationParseError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockDuration(Duration);

impl ClockDuration {
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn as_duration(self) -> Duration {
        self.0
    }

    pub const fn as_secs(self) -> u64 {
        self.0.as_secs()
    }

    pub fn from_json(value: &Value) -> Result<Self, DurationParseError> {
        match value {
            Value::String(s) => s.parse(),
            other => Err(DurationParseError::NotAString {
                found: json_type(other),
            }),
        }
    }
}

impl From<ClockDuration> for Duration {
    fn from(value: ClockDuration) -> Self {
        value.0
    }
}

/// Parses `hours:MM:SS`; hours may have any number of digits, minutes and
/// seconds exactly two.
impl FromStr for ClockDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pattern = || DurationParseError::Pattern(s.to_string());

        let mut parts = s.split(':');
        let (Some(hours), Some(minutes), Some(seconds), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(pattern());
        };
        if hours.is_empty() || !hours.bytes().all(|b| b.is_ascii_digit()) {
            return Err(pattern());
        }
        let two_digits = |field: &str| {
            (field.len() == 2 && field.bytes().all(|b| b.is_ascii_digit()))
                .then(|| field.parse::<u64>().ok())
                .flatten()
        };
        let (Some(minutes), Some(seconds)) = (two_digits(minutes), two_digits(seconds)) else {
            return Err(pattern());
        };

        let total = hours
            .parse::<u64>()
            .ok()
            .and_then(|h| h.checked_mul(3600))
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .ok_or_else(|| DurationParseError::Overflow(s.to_string()))?;
        Ok(Self::from_secs(total))
    }
}

impl<'de> Deserialize<'de> for ClockDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(D::Error::custom)
    }
}

impl fmt::Display for ClockDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = i64::try_from(self.0.as_secs()).unwrap_or(i64::MAX);
        f.write_str(&format_secs(secs))
    }
}

/// Formats whole seconds as `1h2m3s`, dropping leading zero units (`2m0s`,
/// `5s`, `0s`).
pub fn format_secs(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    let (h, m, s) = (secs / 3600, secs / 60 % 60, secs % 60);
    if h > 0 {
        format!("{sign}{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{sign}{m}m{s}s")
    } else {
        format!("{sign}{s}s")
    }
}
