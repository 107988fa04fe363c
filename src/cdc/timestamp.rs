use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("failed to parse epoch seconds '{value}': {source}")]
    ParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("epoch seconds '{0}' out of range")]
    OutOfRange(i64),
}

/// Parse a decimal string of Unix epoch seconds into a UTC instant.
///
/// Surrounding whitespace is not accepted; the value must be a plain base-10
/// integer, optionally signed.
pub fn parse_epoch_seconds(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    let seconds = value.parse::<i64>().map_err(|e| TimestampError::ParseError {
        value: value.to_string(),
        source: e,
    })?;

    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(TimestampError::OutOfRange(seconds))
}

/// Lenient variant of [`parse_epoch_seconds`] used for entity time fields.
///
/// Absent, empty, non-numeric and out-of-range values all map to `None`, the
/// unset value, instead of failing the surrounding decode.
pub fn lenient_epoch_seconds(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    parse_epoch_seconds(value).ok()
}

/// Format an instant as decimal-string epoch seconds (sub-second precision is dropped).
pub fn format_epoch_seconds(ts: &DateTime<Utc>) -> String {
    ts.timestamp().to_string()
}

/// Serde adapter for `Option<DateTime<Utc>>` carried as either an RFC 3339
/// string or an integer number of milliseconds since the epoch.
pub mod rfc3339_or_millis {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(Raw::Millis(millis)) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", millis))),
            Some(Raw::Text(text)) if text.is_empty() => Ok(None),
            Some(Raw::Text(text)) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}
