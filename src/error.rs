//! Error types for decoding SABnzbd responses.

use thiserror::Error;

/// Message prefix shared by every [`UnitParseError`], used to recover the
/// error kind after it has travelled through `serde_json`.
const UNIT_PREFIX: &str = "invalid byte quantity";
const DURATION_PREFIX: &str = "invalid clock duration";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitParseError {
    #[error("invalid byte quantity: expected a number or numeric string, found {found}")]
    NotNumeric { found: &'static str },

    #[error("invalid byte quantity {value:?}: {source}")]
    Float {
        value: String,
        source: std::num::ParseFloatError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("invalid clock duration: expected a string, found {found}")]
    NotAString { found: &'static str },

    #[error("invalid clock duration {0:?}: expected H:MM:SS")]
    Pattern(String),

    #[error("invalid clock duration {0:?}: out of range")]
    Overflow(String),
}

/// Failure reported by the server itself through the `error` field of an
/// otherwise well-formed response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("SABnzbd API error: {message}")]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("{0}")]
    UnitParse(#[source] serde_json::Error),

    #[error("{0}")]
    DurationParse(#[source] serde_json::Error),

    #[error("response has no `{key}` object")]
    MissingEnvelope { key: &'static str },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl DecodeError {
    pub fn is_unit_parse(&self) -> bool {
        matches!(self, Self::UnitParse(_))
    }

    pub fn is_duration_parse(&self) -> bool {
        matches!(self, Self::DurationParse(_))
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            let message = err.to_string();
            if message.starts_with(UNIT_PREFIX) {
                return Self::UnitParse(err);
            }
            if message.starts_with(DURATION_PREFIX) {
                return Self::DurationParse(err);
            }
        }
        Self::MalformedJson(err)
    }
}
