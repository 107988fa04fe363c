use chrono::{DateTime, Utc};

/// A record as supplied by the upstream connector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawRecord {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            key: None,
            payload: payload.into(),
            timestamp: None,
        }
    }
}
