use super::timestamp::rfc3339_or_millis;
use super::DecodeError;
use chrono::{DateTime, Utc};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};

/// A single change-capture event as emitted by the upstream connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdcEnvelope {
    #[serde(default)]
    pub payload: ChangePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub envelope_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "r")]
    Read,
    #[serde(rename = "c")]
    Create,
    #[serde(rename = "u")]
    Update,
    #[serde(rename = "d")]
    Delete,
}

/// Before/after snapshots plus change metadata.
///
/// `before` and `after` are themselves serialized JSON documents carried as
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_op_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub op: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(rename = "timestampMS", default, with = "rfc3339_or_millis")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::cdc::null_as_default")]
    pub optional: bool,
    #[serde(default, deserialize_with = "crate::cdc::null_as_default")]
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    #[serde(default, deserialize_with = "crate::cdc::null_as_default")]
    pub field: String,
    #[serde(rename = "type", default, deserialize_with = "crate::cdc::null_as_default")]
    pub field_type: String,
    #[serde(default, deserialize_with = "crate::cdc::null_as_default")]
    pub optional: bool,
}

impl CdcEnvelope {
    /// The post-change document, if the event carries a non-empty one.
    ///
    /// Deletes carry only `before` and therefore yield `None`.
    pub fn after_document(&self) -> Option<&str> {
        self.payload.after.as_deref().filter(|after| !after.is_empty())
    }

    pub fn operation(&self) -> Option<Operation> {
        self.payload.op
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// An empty or null `op` leaves the operation unset.
fn empty_op_as_none<'de, D>(deserializer: D) -> Result<Option<Operation>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(code) => Operation::deserialize(code.into_deserializer()).map(Some),
    }
}

/// Parse a raw record payload into a [`CdcEnvelope`].
pub fn decode_envelope(raw: &[u8]) -> Result<CdcEnvelope, DecodeError> {
    serde_json::from_slice(raw).map_err(DecodeError::Envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope_bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_decode_create_event() {
        let raw = envelope_bytes(json!({
            "schema": {
                "type": "struct",
                "name": "mdb.events.Envelope",
                "optional": false,
                "fields": [{"field": "after", "type": "string", "optional": true}]
            },
            "payload": {
                "after": "{\"user_id\":\"u1\"}",
                "op": "c",
                "source": {"db": "mdb", "collection": "events"},
                "timestampMS": 1700000000123i64
            }
        }));

        let envelope = decode_envelope(&raw).unwrap();

        assert_eq!(envelope.operation(), Some(Operation::Create));
        assert_eq!(envelope.after_document(), Some("{\"user_id\":\"u1\"}"));
        assert_eq!(envelope.payload.source.as_ref().unwrap()["db"], "mdb");
        assert_eq!(
            envelope.payload.timestamp.unwrap().timestamp_millis(),
            1700000000123
        );
        let schema = envelope.schema.unwrap();
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].field, "after");
    }

    #[test]
    fn test_decode_rfc3339_change_timestamp() {
        let raw = envelope_bytes(json!({
            "payload": {"op": "u", "after": "{}", "timestampMS": "2023-11-14T22:13:20Z"}
        }));

        let envelope = decode_envelope(&raw).unwrap();

        assert_eq!(envelope.payload.timestamp.unwrap().timestamp(), 1700000000);
    }

    #[test]
    fn test_delete_has_no_after_document() {
        let raw = envelope_bytes(json!({
            "payload": {"op": "d", "before": "{\"user_id\":\"u1\"}"}
        }));

        let envelope = decode_envelope(&raw).unwrap();

        assert_eq!(envelope.operation(), Some(Operation::Delete));
        assert!(envelope.after_document().is_none());
    }

    #[test]
    fn test_empty_after_is_no_document() {
        let raw = envelope_bytes(json!({"payload": {"op": "c", "after": ""}}));
        let envelope = decode_envelope(&raw).unwrap();
        assert!(envelope.after_document().is_none());

        let raw = envelope_bytes(json!({"payload": {"op": "c", "after": null}}));
        let envelope = decode_envelope(&raw).unwrap();
        assert!(envelope.after_document().is_none());
    }

    #[test]
    fn test_not_json_is_decode_error() {
        let result = decode_envelope(b"\x00\x01 not json");
        assert!(matches!(result, Err(DecodeError::Envelope(_))));
    }

    #[test]
    fn test_unknown_operation_is_decode_error() {
        let raw = envelope_bytes(json!({"payload": {"op": "x", "after": "{}"}}));
        assert!(matches!(decode_envelope(&raw), Err(DecodeError::Envelope(_))));
    }

    #[test]
    fn test_object_after_is_decode_error() {
        // after must be double-encoded
        let raw = envelope_bytes(json!({"payload": {"op": "c", "after": {"user_id": "u1"}}}));
        assert!(matches!(decode_envelope(&raw), Err(DecodeError::Envelope(_))));
    }

    #[test]
    fn test_null_schema_attributes_are_tolerated() {
        let raw = envelope_bytes(json!({
            "schema": {
                "type": "struct",
                "optional": null,
                "fields": null
            },
            "payload": {"op": "c", "after": "{\"user_id\":\"u1\"}"}
        }));

        let envelope = decode_envelope(&raw).unwrap();

        let schema = envelope.schema.as_ref().unwrap();
        assert!(!schema.optional);
        assert!(schema.fields.is_empty());
        assert_eq!(envelope.after_document(), Some("{\"user_id\":\"u1\"}"));
    }

    #[test]
    fn test_null_schema_field_attributes_are_tolerated() {
        let raw = envelope_bytes(json!({
            "schema": {"fields": [{"field": "after", "type": null, "optional": null}]},
            "payload": {"op": "u", "after": "{}"}
        }));

        let schema = decode_envelope(&raw).unwrap().schema.unwrap();

        assert_eq!(schema.fields[0].field, "after");
        assert_eq!(schema.fields[0].field_type, "");
        assert!(!schema.fields[0].optional);
    }

    #[test]
    fn test_empty_or_null_operation_is_unset() {
        for op in [json!(""), json!(null)] {
            let raw = envelope_bytes(json!({"payload": {"op": op, "after": "{}"}}));
            let envelope = decode_envelope(&raw).unwrap();
            assert_eq!(envelope.operation(), None);
            assert_eq!(envelope.after_document(), Some("{}"));
        }
    }

    #[test]
    fn test_to_bytes_reparses() {
        let raw = envelope_bytes(json!({
            "payload": {"op": "r", "after": "{\"user_id\":\"u9\"}", "timestampMS": 1000}
        }));
        let envelope = decode_envelope(&raw).unwrap();

        let reparsed = decode_envelope(&envelope.to_bytes().unwrap()).unwrap();

        assert_eq!(reparsed, envelope);
    }
}
