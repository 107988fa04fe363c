use crate::cdc::{encode_event, EncodeError, Event};
use chrono::{DateTime, Utc};
use tracing::debug;

/// A record handed back to the runtime for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub key: String,
    pub payload: Vec<u8>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Encode a slice of events into output records keyed by user id and
/// stamped with the event's update time.
pub fn encode_events(events: &[Event]) -> Result<Vec<OutputRecord>, EncodeError> {
    let mut records = Vec::with_capacity(events.len());
    for event in events {
        let payload = encode_event(event)?;
        debug!(key = %event.user_id, bytes = payload.len(), "Emitted record");
        records.push(OutputRecord {
            key: event.user_id.clone(),
            payload,
            timestamp: event.updated_at,
        });
    }
    Ok(records)
}
