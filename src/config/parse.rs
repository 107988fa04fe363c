use super::types::*;
use crate::config::{env_var_pattern, expand_env_vars, expand_tilde};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse and validate config from a YAML string.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml)?;

    let mut config: Config = serde_yaml::from_str(&yaml)?;

    for resource in config.resources.values_mut() {
        resource.path = expand_tilde(&resource.path);
    }

    validate_config(&config)?;

    Ok(config)
}

fn check_unexpanded_vars(yaml: &str) -> Result<(), ConfigError> {
    let mut unexpanded: Vec<&str> = env_var_pattern()
        .captures_iter(yaml)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect();

    if unexpanded.is_empty() {
        return Ok(());
    }

    unexpanded.sort_unstable();
    unexpanded.dedup();

    let message = if unexpanded.len() == 1 {
        format!(
            "Environment variable $env{{{0}}} is not set.\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variable: export {0}=...\n\
             2. Replace $env{{{0}}} in the config file with an actual value",
            unexpanded[0]
        )
    } else {
        format!(
            "Environment variables are not set: {}\n\
             \n\
             Set them or replace the references in the config file with actual values",
            unexpanded.join(", ")
        )
    };

    Err(ConfigError::Validation(message))
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.resources.is_empty() {
        errors.push("config must declare at least one resource".to_string());
    }

    validate_endpoint(
        "source",
        &config.source.resource,
        &config.source.collection,
        config,
        &mut errors,
    );
    validate_endpoint(
        "destination",
        &config.destination.resource,
        &config.destination.collection,
        config,
        &mut errors,
    );

    for (i, entry) in config.destination.config.iter().enumerate() {
        if entry.key.is_empty() {
            errors.push(format!("destination.config[{}]: key cannot be empty", i));
        }
    }

    if let PredicateConfig::Activity { activities } = &config.filter.predicate {
        if activities.is_empty() {
            errors.push("filter.predicate: 'activity' predicate needs at least one activity".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_endpoint(
    context: &str,
    resource: &str,
    collection: &str,
    config: &Config,
    errors: &mut Vec<String>,
) {
    if !config.resources.contains_key(resource) {
        errors.push(format!(
            "{}: references non-existent resource '{}'",
            context, resource
        ));
    }
    if collection.is_empty() {
        errors.push(format!("{}: collection cannot be empty", context));
    }
}
