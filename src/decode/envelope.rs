//! Decoding for responses whose payload sits under a named key, e.g.
//! `{"queue": {...}}` or `{"history": {...}}`.
//!
//! The wrapper is read first, the payload is then decoded through the
//! type's plain field mapping, and finally the type's post-processing runs.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::Deserializer;
use serde::de::{DeserializeSeed, Error as _, IgnoredAny, MapAccess, Visitor};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::error::{ApiError, DecodeError};

/// A response type delivered inside an envelope.
///
/// `deserialize_plain` must be the type's ordinary field mapping (not the
/// envelope-aware `Deserialize` impl) and must fill absent fields with their
/// defaults, so that a payload can be decoded one field at a time.
pub trait Enveloped: Sized {
    /// Top-level key holding the payload.
    const KEY: &'static str;

    fn deserialize_plain<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>;

    /// Derives computed fields once the payload has been decoded.
    fn post_process(&mut self);
}

/// Result of a lenient envelope decode: the post-processed value plus the
/// payload error, if any field failed to decode.
#[derive(Debug)]
pub struct Decoded<T> {
    pub value: T,
    pub warning: Option<DecodeError>,
}

impl<T> Decoded<T> {
    pub fn complete(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.warning.is_some()
    }

    pub fn into_result(self) -> Result<T, DecodeError> {
        match self.warning {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

/// Decodes an enveloped document.
///
/// A missing or unreadable envelope is a hard error. A payload that fails to
/// decode is salvaged field by field: fields that decode on their own are
/// kept, post-processing runs, and the original error comes back as the
/// warning.
pub fn decode<T: Enveloped>(bytes: &[u8]) -> Result<Decoded<T>, DecodeError> {
    let document: HashMap<String, &RawValue> = serde_json::from_slice(bytes)?;
    let Some(payload) = document.get(T::KEY) else {
        return Err(missing_envelope::<T>(&document));
    };

    match plain_from_str::<T>(payload.get()) {
        Ok(mut value) => {
            value.post_process();
            Ok(Decoded::complete(value))
        }
        Err(err) => {
            let Some(mut value) = salvage::<T>(payload.get()) else {
                return Err(err.into());
            };
            value.post_process();
            let warning = DecodeError::from(err);
            tracing::debug!(key = T::KEY, error = %warning, "decoded partial payload");
            Ok(Decoded {
                value,
                warning: Some(warning),
            })
        }
    }
}

fn missing_envelope<T: Enveloped>(document: &HashMap<String, &RawValue>) -> DecodeError {
    let message = document
        .get("error")
        .and_then(|raw| serde_json::from_str::<String>(raw.get()).ok())
        .filter(|message| !message.is_empty());
    match message {
        Some(message) => ApiError::new(message).into(),
        None => DecodeError::MissingEnvelope { key: T::KEY },
    }
}

fn plain_from_str<T: Enveloped>(payload: &str) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(payload);
    let value = T::deserialize_plain(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Rebuilds a payload from the fields that decode on their own. Arrays (the
/// `slots` lists) are salvaged element by element: a bad element is dropped
/// whole rather than kept with its bad fields zeroed.
fn salvage<T: Enveloped>(payload: &str) -> Option<T> {
    let fields: Map<String, Value> = serde_json::from_str(payload).ok()?;
    let kept: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(key, value)| salvage_field::<T>(key, value))
        .collect();
    T::deserialize_plain(&Value::Object(kept)).ok()
}

fn salvage_field<T: Enveloped>(key: String, value: Value) -> Option<(String, Value)> {
    if decodes_alone::<T>(&key, &value) {
        return Some((key, value));
    }
    if let Value::Array(items) = value {
        let total = items.len();
        let items: Vec<Value> = items
            .into_iter()
            .filter(|item| decodes_alone::<T>(&key, &Value::Array(vec![item.clone()])))
            .collect();
        let dropped = total - items.len();
        let items = Value::Array(items);
        if decodes_alone::<T>(&key, &items) {
            tracing::debug!(key = T::KEY, field = %key, dropped, "dropping undecodable elements");
            return Some((key, items));
        }
    }
    tracing::debug!(key = T::KEY, field = %key, "dropping undecodable field");
    None
}

fn decodes_alone<T: Enveloped>(key: &str, value: &Value) -> bool {
    let single = Value::Object(Map::from_iter([(key.to_string(), value.clone())]));
    T::deserialize_plain(&single).is_ok()
}

/// Strict envelope-aware deserialization for use in `Deserialize` impls.
/// Any payload error aborts.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Enveloped,
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(EnvelopeVisitor(PhantomData))
}

struct EnvelopeVisitor<T>(PhantomData<T>);

impl<'de, T: Enveloped> Visitor<'de> for EnvelopeVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an object with a `{}` key", T::KEY)
    }

    fn visit_map<A>(self, mut map: A) -> Result<T, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut payload: Option<T> = None;
        let mut error: Option<String> = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == T::KEY {
                if payload.is_some() {
                    return Err(A::Error::duplicate_field(T::KEY));
                }
                payload = Some(map.next_value_seed(PlainSeed(PhantomData))?);
            } else if key == "error" {
                error = match map.next_value::<Value>()? {
                    Value::String(message) => Some(message),
                    _ => None,
                };
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        match (payload, error.filter(|e| !e.is_empty())) {
            (Some(mut value), _) => {
                value.post_process();
                Ok(value)
            }
            (None, Some(message)) => Err(A::Error::custom(ApiError::new(message))),
            (None, None) => Err(A::Error::missing_field(T::KEY)),
        }
    }
}

struct PlainSeed<T>(PhantomData<T>);

impl<'de, T: Enveloped> DeserializeSeed<'de> for PlainSeed<T> {
    type Value = T;

    fn deserialize<D>(self, deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize_plain(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    use crate::units::BytesFromMb;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(remote = "Self", default)]
    struct Totals {
        mb: BytesFromMb,
        mbleft: BytesFromMb,
        name: String,
        #[serde(skip)]
        missing: BytesFromMb,
    }

    impl Enveloped for Totals {
        const KEY: &'static str = "totals";

        fn deserialize_plain<'de, D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            Totals::deserialize(deserializer)
        }

        fn post_process(&mut self) {
            self.missing = self.mb - self.mbleft;
        }
    }

    impl<'de> Deserialize<'de> for Totals {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserialize(deserializer)
        }
    }

    #[test]
    fn unwraps_and_post_processes() {
        let json = br#"{"totals": {"mb": "10", "mbleft": 4, "name": "x"}, "other": [1, 2]}"#;
        let decoded = decode::<Totals>(json).unwrap();
        assert!(!decoded.is_partial());
        let totals = decoded.into_result().unwrap();
        assert_eq!(totals.missing.bytes(), 6_000_000);
        assert_eq!(totals.name, "x");
    }

    #[test]
    fn strict_deserialize_matches_decode() {
        let json = r#"{"totals": {"mb": "10", "mbleft": 4, "name": "x"}}"#;
        let strict: Totals = serde_json::from_str(json).unwrap();
        let lenient = decode::<Totals>(json.as_bytes()).unwrap().value;
        assert_eq!(strict, lenient);
    }

    #[test]
    fn missing_envelope_is_a_hard_failure() {
        let err = decode::<Totals>(br#"{"other": {}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingEnvelope { key: "totals" }));

        let err = serde_json::from_str::<Totals>(r#"{"other": {}}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `totals`"));
    }

    #[test]
    fn root_error_surfaces_as_api_error() {
        let err = decode::<Totals>(br#"{"status": false, "error": "API Key Required"}"#)
            .unwrap_err();
        assert!(
            matches!(err, DecodeError::Api(ref e) if e.message == "API Key Required"),
            "{err}"
        );
    }

    #[test]
    fn malformed_document_is_a_hard_failure() {
        let err = decode::<Totals>(br#"{"totals": {"mb": 1"#).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedJson(_)));
    }

    #[test]
    fn bad_field_yields_partial_value_and_warning() {
        let json = br#"{"totals": {"mb": "10", "mbleft": true, "name": "x"}}"#;
        let decoded = decode::<Totals>(json).unwrap();
        assert!(decoded.is_partial());
        assert_eq!(decoded.value.mb.bytes(), 10_000_000);
        assert_eq!(decoded.value.mbleft.bytes(), 0);
        assert_eq!(decoded.value.missing.bytes(), 10_000_000);
        assert_eq!(decoded.value.name, "x");
        assert!(decoded.into_result().unwrap_err().is_unit_parse());
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Entry {
        mb: BytesFromMb,
        name: String,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(remote = "Self", default)]
    struct Listing {
        entries: Vec<Entry>,
        tags: Vec<String>,
        total: BytesFromMb,
    }

    impl Enveloped for Listing {
        const KEY: &'static str = "listing";

        fn deserialize_plain<'de, D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            Listing::deserialize(deserializer)
        }

        fn post_process(&mut self) {
            let bytes = self.entries.iter().map(|e| e.mb.bytes()).sum();
            self.total = BytesFromMb::from_bytes(bytes);
        }
    }

    #[test]
    fn bad_elements_are_dropped_from_arrays() {
        let json = br#"{"listing": {
            "entries": [{"mb": "5", "name": "a"}, {"mb": "lots", "name": "b"}, {"name": "c"}],
            "tags": "not-a-list"
        }}"#;
        let decoded = decode::<Listing>(json).unwrap();
        assert!(decoded.is_partial());
        let names: Vec<&str> = decoded.value.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(decoded.value.total.bytes(), 5_000_000);
        assert!(decoded.value.tags.is_empty());
        assert!(decoded.into_result().unwrap_err().is_unit_parse());
    }

    #[test]
    fn strict_deserialize_aborts_on_bad_field() {
        let json = r#"{"totals": {"mb": "ten"}}"#;
        assert!(serde_json::from_str::<Totals>(json).is_err());
    }

    #[test]
    fn non_object_payload_is_a_hard_failure() {
        let err = decode::<Totals>(br#"{"totals": "nope"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedJson(_)));
    }
}
