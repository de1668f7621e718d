//! Client and response decoders for the SABnzbd JSON API.
//!
//! SABnzbd sends numbers as either JSON numbers or strings, reports sizes in
//! bytes, KB, MB or GB depending on the field, encodes durations as
//! `H:MM:SS` and wraps the queue and history payloads under a named key.
//! The types here normalize all of that at decode time.

pub mod clock;
pub mod config;
pub mod decode;
pub mod error;
pub mod models;
pub mod sab_client;
pub mod units;

pub use clock::ClockDuration;
pub use decode::{Decoded, decode};
pub use error::{ApiError, DecodeError, DurationParseError, UnitParseError};
pub use sab_client::SabClient;
pub use units::{BytesFromB, BytesFromGb, BytesFromKb, BytesFromMb, ScaledBytes, human_readable};
