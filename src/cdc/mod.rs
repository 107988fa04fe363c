pub mod envelope;
pub mod event;
pub mod timestamp;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub use envelope::{decode_envelope, CdcEnvelope, ChangePayload, Operation, Schema, SchemaField};
pub use event::{decode_event, encode_event, Event, EventWire};

/// Raw bytes do not match the expected shape of a CDC envelope or entity.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed CDC envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("malformed entity document: {0}")]
    Entity(#[source] serde_json::Error),
}

/// An entity could not be serialized for output.
#[derive(Debug, Error)]
#[error("failed to encode entity '{key}': {source}")]
pub struct EncodeError {
    pub key: String,
    #[source]
    pub source: serde_json::Error,
}

/// Deserialize an explicit `null` as the field's default value.
///
/// Pair with `#[serde(default)]` so a missing key behaves the same way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
