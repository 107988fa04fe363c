use super::timestamp::{format_epoch_seconds, lenient_epoch_seconds};
use super::{DecodeError, EncodeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An activity event captured from the `events` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    pub user_id: String,
    pub activity: String,
    pub vip: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Wire shape of [`Event`]: time fields are decimal-string epoch seconds.
///
/// Decoding goes through this struct first so that structural problems fail
/// the decode while bad time values only lose the affected field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventWire {
    pub user_id: String,
    #[serde(default, deserialize_with = "crate::cdc::null_as_default")]
    pub activity: String,
    #[serde(default, deserialize_with = "crate::cdc::null_as_default")]
    pub vip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl From<EventWire> for Event {
    fn from(wire: EventWire) -> Self {
        Self {
            created_at: lenient_epoch_seconds(wire.created_at.as_deref()),
            updated_at: lenient_epoch_seconds(wire.updated_at.as_deref()),
            deleted_at: lenient_epoch_seconds(wire.deleted_at.as_deref()),
            user_id: wire.user_id,
            activity: wire.activity,
            vip: wire.vip,
        }
    }
}

impl From<&Event> for EventWire {
    fn from(event: &Event) -> Self {
        Self {
            user_id: event.user_id.clone(),
            activity: event.activity.clone(),
            vip: event.vip,
            created_at: event.created_at.as_ref().map(format_epoch_seconds),
            updated_at: event.updated_at.as_ref().map(format_epoch_seconds),
            deleted_at: event.deleted_at.as_ref().map(format_epoch_seconds),
        }
    }
}

/// Decode an `after` document into an [`Event`].
pub fn decode_event(raw: &[u8]) -> Result<Event, DecodeError> {
    let wire: EventWire = serde_json::from_slice(raw).map_err(DecodeError::Entity)?;
    Ok(Event::from(wire))
}

/// Serialize an [`Event`] in its wire shape.
pub fn encode_event(event: &Event) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(&EventWire::from(event)).map_err(|e| EncodeError {
        key: event.user_id.clone(),
        source: e,
    })
}
