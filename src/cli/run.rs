use crate::app::{run_app, AppError};
use crate::config::parse::load_config;
use crate::resource::Resources;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config not found; searched ~/.config/cdc-filter/config.yml and /etc/cdc-filter/config.yml. Use --config <path> or run 'cdc-filter config init'")]
    ConfigNotFound,

    #[error("config error: {0}")]
    Config(#[from] crate::config::parse::ConfigError),

    #[error(transparent)]
    App(#[from] AppError),
}

pub async fn run(config_path: Option<PathBuf>) -> Result<(), RunError> {
    let config_path = config_path.ok_or(RunError::ConfigNotFound)?;
    run_once(&config_path).await
}

async fn run_once(config_path: &Path) -> Result<(), RunError> {
    info!(config_path = %config_path.display(), "Loading configuration");
    let config = load_config(config_path)?;

    let resources = Resources::from_config(&config);
    let stats = run_app(&config, &resources).await?;

    info!(
        received = stats.received,
        emitted = stats.emitted,
        decode_errors = stats.decode_errors,
        "Run complete"
    );
    Ok(())
}
