//! Byte quantities as SABnzbd reports them: bytes, KB, MB or GB depending on
//! the field, sent either as JSON numbers or as numeric strings.

use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

use crate::decode::json_type;
use crate::error::UnitParseError;

pub const KBYTE: u64 = 1_000;
pub const MBYTE: u64 = 1_000 * KBYTE;
pub const GBYTE: u64 = 1_000 * MBYTE;
pub const TBYTE: u64 = 1_000 * GBYTE;
pub const PBYTE: u64 = 1_000 * TBYTE;

/// A byte count decoded from a wire value expressed in units of `SCALE`
/// bytes. The stored value is always in plain bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScaledBytes<const SCALE: u64>(i64);

pub type BytesFromB = ScaledBytes<1>;
pub type BytesFromKb = ScaledBytes<KBYTE>;
pub type BytesFromMb = ScaledBytes<MBYTE>;
pub type BytesFromGb = ScaledBytes<GBYTE>;

impl<const SCALE: u64> ScaledBytes<SCALE> {
    pub const fn from_bytes(bytes: i64) -> Self {
        Self(bytes)
    }

    /// Scales a magnitude given in this flavor's unit, truncating toward zero.
    pub fn from_magnitude(magnitude: f64) -> Self {
        Self((magnitude * SCALE as f64) as i64)
    }

    pub const fn bytes(self) -> i64 {
        self.0
    }

    /// Reinterprets the byte count under another flavor. No rescaling happens
    /// since the value is already in bytes.
    pub const fn cast<const OTHER: u64>(self) -> ScaledBytes<OTHER> {
        ScaledBytes(self.0)
    }

    pub fn from_json(value: &Value) -> Result<Self, UnitParseError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Self::from_magnitude)
                .ok_or(UnitParseError::NotNumeric { found: "number" }),
            Value::String(s) => s.parse(),
            other => Err(UnitParseError::NotNumeric {
                found: json_type(other),
            }),
        }
    }
}

impl<const SCALE: u64> FromStr for ScaledBytes<SCALE> {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<f64>()
            .map(Self::from_magnitude)
            .map_err(|source| UnitParseError::Float {
                value: s.to_string(),
                source,
            })
    }
}

impl<'de, const SCALE: u64> Deserialize<'de> for ScaledBytes<SCALE> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(D::Error::custom)
    }
}

impl<const SCALE: u64> Sub for ScaledBytes<SCALE> {
    type Output = Self;

    /// Wraps on overflow, like the server's native integer arithmetic.
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl<const SCALE: u64> fmt::Display for ScaledBytes<SCALE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&human_readable(self.0))
    }
}

/// Renders a byte count with decimal (power of 1000) units and two decimals.
pub fn human_readable(bytes: i64) -> String {
    let scaled = |unit: u64| bytes as f64 / unit as f64;
    if bytes < KBYTE as i64 {
        format!("{} B", bytes)
    } else if bytes < MBYTE as i64 {
        format!("{:.2} KB", scaled(KBYTE))
    } else if bytes < GBYTE as i64 {
        format!("{:.2} MB", scaled(MBYTE))
    } else if bytes < TBYTE as i64 {
        format!("{:.2} GB", scaled(GBYTE))
    } else if bytes < PBYTE as i64 {
        format!("{:.2} TB", scaled(TBYTE))
    } else {
        format!("{:.2} PB", scaled(PBYTE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode<const SCALE: u64>(json: &str) -> Result<ScaledBytes<SCALE>, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn number_and_string_decode_alike() {
        assert_eq!(decode::<1>("5").unwrap(), decode::<1>(r#""5""#).unwrap());
        assert_eq!(decode::<1>("5").unwrap().bytes(), 5);

        let kb: BytesFromKb = serde_json::from_str(r#""5""#).unwrap();
        assert_eq!(kb, serde_json::from_str::<BytesFromKb>("5").unwrap());
        assert_eq!(kb.bytes(), 5_000);

        let mb: BytesFromMb = serde_json::from_str(r#""5""#).unwrap();
        assert_eq!(mb, serde_json::from_str::<BytesFromMb>("5").unwrap());
        assert_eq!(mb.bytes(), 5_000_000);

        let gb: BytesFromGb = serde_json::from_str(r#""5""#).unwrap();
        assert_eq!(gb, serde_json::from_str::<BytesFromGb>("5").unwrap());
        assert_eq!(gb.bytes(), 5_000_000_000);
    }

    #[test]
    fn one_gigabyte() {
        let gb: BytesFromGb = serde_json::from_str("1").unwrap();
        assert_eq!(gb.bytes(), 1_000_000_000);
    }

    #[test]
    fn fractions_are_scaled_then_truncated() {
        let mb: BytesFromMb = serde_json::from_str(r#""1.5""#).unwrap();
        assert_eq!(mb.bytes(), 1_500_000);

        let b: BytesFromB = serde_json::from_str("2.9").unwrap();
        assert_eq!(b.bytes(), 2);
    }

    #[test]
    fn rejects_non_numeric_values() {
        for json in ["true", "null", r#""abc""#, "[]", "{}", r#""""#] {
            let err = serde_json::from_str::<BytesFromMb>(json).unwrap_err();
            assert!(
                err.to_string().starts_with("invalid byte quantity"),
                "{json}: {err}"
            );
        }
    }

    #[test]
    fn not_numeric_reports_found_type() {
        let err = BytesFromB::from_json(&Value::Bool(true)).unwrap_err();
        assert_eq!(err, UnitParseError::NotNumeric { found: "boolean" });
    }

    #[test]
    fn subtraction_may_go_negative() {
        let missing = BytesFromMb::from_bytes(40) - BytesFromMb::from_bytes(100);
        assert_eq!(missing.bytes(), -60);
    }

    #[test]
    fn subtraction_wraps_instead_of_panicking() {
        let missing = BytesFromB::from_bytes(i64::MAX) - BytesFromB::from_bytes(-1);
        assert_eq!(missing.bytes(), i64::MIN);
    }

    #[test]
    fn human_readable_thresholds() {
        assert_eq!(human_readable(0), "0 B");
        assert_eq!(human_readable(999), "999 B");
        assert_eq!(human_readable(1_000), "1.00 KB");
        assert_eq!(human_readable(1_500), "1.50 KB");
        assert_eq!(human_readable(999_999), "1000.00 KB");
        assert_eq!(human_readable(1_500_000), "1.50 MB");
        assert_eq!(human_readable(2_250_000_000), "2.25 GB");
        assert_eq!(human_readable(3_000_000_000_000), "3.00 TB");
        assert_eq!(human_readable(4_500_000_000_000_000), "4.50 PB");
    }

    #[test]
    fn negative_counts_render_as_bytes() {
        assert_eq!(human_readable(-5_000), "-5000 B");
    }

    #[test]
    fn display_uses_normalized_bytes() {
        let gb: BytesFromGb = serde_json::from_str(r#""1.5""#).unwrap();
        assert_eq!(gb.to_string(), "1.50 GB");
        let kb: BytesFromKb = serde_json::from_str("1500").unwrap();
        assert_eq!(kb.to_string(), "1.50 MB");
    }
}
