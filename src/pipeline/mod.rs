pub mod processor;

pub use processor::{parse_event_record, BatchStats, FilterProcessor, PipelineError, RecordProcessor};
