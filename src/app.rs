use crate::config::types::Config;
use crate::pipeline::{BatchStats, FilterProcessor, PipelineError};
use crate::resource::{ResourceError, Resources};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Pull the source collection, filter it, and write the interesting events
/// to the destination collection.
pub async fn run_app(config: &Config, resources: &Resources) -> Result<BatchStats, AppError> {
    // Pull the source collection
    let source = resources.get(&config.source.resource)?;
    let records = source.records(&config.source.collection).await?;
    info!(
        resource = %config.source.resource,
        collection = %config.source.collection,
        count = records.len(),
        "Pulled records"
    );

    // Filter
    let processor = FilterProcessor::from_config(&config.filter);
    let (output, stats) = processor.process_with_stats(&records)?;

    // Write out the interesting events
    let destination = resources.get(&config.destination.resource)?;
    destination
        .write(
            &output,
            &config.destination.collection,
            &config.destination.config,
        )
        .await?;

    Ok(stats)
}
