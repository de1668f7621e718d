//! Decode entry points and serde helpers shared by the response models.

pub mod envelope;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;

pub use envelope::{Decoded, Enveloped};

/// Decodes a flat (non-enveloped) response document.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError::from)
}

/// JSON type name used in error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Internal serde helpers
pub mod de {
    use serde::{Deserialize, Deserializer, de::Error as _};

    /// Accept an i64 from either a number or a string like "100".
    pub fn i64_from_str_or_num<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumOrStr {
            Num(i64),
            Str(String),
        }

        match NumOrStr::deserialize(deserializer)? {
            NumOrStr::Num(n) => Ok(n),
            NumOrStr::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| D::Error::custom(format!("invalid integer {s:?}: {e}"))),
        }
    }
}
