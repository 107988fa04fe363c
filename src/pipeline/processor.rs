use crate::cdc::{decode_envelope, decode_event, DecodeError, EncodeError, Event};
use crate::config::types::{DecodeErrorStrategy, FilterConfig};
use crate::filter::{encode_events, predicate_from_config, InterestPredicate, OutputRecord, VipPredicate};
use crate::record::RawRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that fail a whole batch
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("record {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Counters for a single batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub received: usize,
    pub decoded: usize,
    /// Records without an `after` document (deletes, empty snapshots)
    pub no_entity: usize,
    pub decode_errors: usize,
    pub filtered_out: usize,
    pub emitted: usize,
}

/// A pipeline stage turning a batch of raw records into output records.
pub trait RecordProcessor: Send + Sync {
    fn process(&self, records: &[RawRecord]) -> Result<Vec<OutputRecord>, PipelineError>;
}

/// Extracts events from CDC records and forwards the interesting ones.
///
/// Holds no per-batch state, so one instance may serve concurrent batches.
pub struct FilterProcessor {
    predicate: Box<dyn InterestPredicate>,
    on_decode_error: DecodeErrorStrategy,
}

impl Default for FilterProcessor {
    fn default() -> Self {
        Self::new(Box::new(VipPredicate))
    }
}

impl FilterProcessor {
    pub fn new(predicate: Box<dyn InterestPredicate>) -> Self {
        Self {
            predicate,
            on_decode_error: DecodeErrorStrategy::Skip,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            predicate: predicate_from_config(&config.predicate),
            on_decode_error: config.on_decode_error,
        }
    }

    pub fn with_decode_error_strategy(mut self, strategy: DecodeErrorStrategy) -> Self {
        self.on_decode_error = strategy;
        self
    }

    /// Process a batch and report what happened to each record.
    pub fn process_with_stats(
        &self,
        records: &[RawRecord],
    ) -> Result<(Vec<OutputRecord>, BatchStats), PipelineError> {
        let mut stats = BatchStats {
            received: records.len(),
            ..Default::default()
        };
        let mut interesting: Vec<Event> = Vec::new();

        // Decode every record; a bad one never stops the rest of the batch
        for (index, record) in records.iter().enumerate() {
            let event = match parse_event_record(record) {
                Ok(Some(event)) => event,
                Ok(None) => {
                    // Deletes and empty snapshots produce nothing
                    stats.no_entity += 1;
                    continue;
                }
                Err(e) => {
                    stats.decode_errors += 1;
                    match self.on_decode_error {
                        DecodeErrorStrategy::Skip => {
                            warn!(
                                index,
                                key = record.key.as_deref().unwrap_or(""),
                                error = %e,
                                "Skipping undecodable record"
                            );
                            continue;
                        }
                        DecodeErrorStrategy::Fail => {
                            return Err(PipelineError::Decode { index, source: e });
                        }
                    }
                }
            };
            stats.decoded += 1;

            // Apply the interest predicate
            if self.predicate.is_interesting(&event) {
                interesting.push(event);
            } else {
                stats.filtered_out += 1;
            }
        }

        // Encode survivors; an encode failure fails the whole batch
        let output = encode_events(&interesting)?;
        stats.emitted = output.len();

        info!(
            predicate = self.predicate.name(),
            received = stats.received,
            emitted = stats.emitted,
            filtered_out = stats.filtered_out,
            no_entity = stats.no_entity,
            decode_errors = stats.decode_errors,
            "Processed batch"
        );

        Ok((output, stats))
    }
}

impl RecordProcessor for FilterProcessor {
    fn process(&self, records: &[RawRecord]) -> Result<Vec<OutputRecord>, PipelineError> {
        self.process_with_stats(records).map(|(output, _)| output)
    }
}

/// Unwrap one CDC record down to its post-change event.
///
/// `Ok(None)` means the record carries no `after` document.
pub fn parse_event_record(record: &RawRecord) -> Result<Option<Event>, DecodeError> {
    let envelope = decode_envelope(&record.payload)?;

    let Some(after) = envelope.after_document() else {
        debug!(op = ?envelope.operation(), "No after document, skipping");
        return Ok(None);
    };
    debug!(after = %after, "Extracted after document");

    let event = decode_event(after.as_bytes())?;
    debug!(?event, "Event record");
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cdc_record(after: &str) -> RawRecord {
        let envelope = json!({"payload": {"op": "c", "after": after}});
        RawRecord::new(serde_json::to_vec(&envelope).unwrap())
    }

    #[test]
    fn test_stats_account_for_every_record() {
        let batch = vec![
            cdc_record(r#"{"user_id":"u1","activity":"login","vip":true}"#),
            cdc_record(r#"{"user_id":"u2","activity":"login","vip":false}"#),
            cdc_record(""),
            cdc_record(r#"{"user_id":"#),
            RawRecord::new("garbage"),
        ];

        let (output, stats) = FilterProcessor::default().process_with_stats(&batch).unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(
            stats,
            BatchStats {
                received: 5,
                decoded: 2,
                no_entity: 1,
                decode_errors: 2,
                filtered_out: 1,
                emitted: 1,
            }
        );
    }

    #[test]
    fn test_fail_strategy_stops_at_first_error() {
        let batch = vec![
            cdc_record(r#"{"user_id":"u1","vip":true}"#),
            RawRecord::new("garbage"),
        ];

        let processor =
            FilterProcessor::default().with_decode_error_strategy(DecodeErrorStrategy::Fail);
        let result = processor.process(&batch);

        assert!(matches!(result, Err(PipelineError::Decode { index: 1, .. })));
    }

    #[test]
    fn test_parse_event_record_delete() {
        let envelope = json!({"payload": {"op": "d", "before": "{\"user_id\":\"u1\"}"}});
        let record = RawRecord::new(serde_json::to_vec(&envelope).unwrap());

        assert!(parse_event_record(&record).unwrap().is_none());
    }

    #[test]
    fn test_custom_predicate() {
        let processor = FilterProcessor::new(Box::new(|ev: &Event| ev.activity == "purchase"));
        let batch = vec![
            cdc_record(r#"{"user_id":"u1","activity":"purchase","vip":false}"#),
            cdc_record(r#"{"user_id":"u2","activity":"login","vip":true}"#),
        ];

        let output = processor.process(&batch).unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].key, "u1");
    }
}
