use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub resources: HashMap<String, ResourceDefinition>,
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    File,
}

/// Where inbound CDC records are pulled from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub resource: String,
    pub collection: String,
}

/// Where interesting records are written to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub resource: String,
    pub collection: String,
    #[serde(default)]
    pub config: Vec<ResourceConfigEntry>,
}

/// A declarative key/value option passed to the destination on write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfigEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub predicate: PredicateConfig,
    #[serde(default)]
    pub on_decode_error: DecodeErrorStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PredicateConfig {
    #[default]
    Vip,
    Activity {
        activities: Vec<String>,
    },
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeErrorStrategy {
    #[default]
    Skip,
    Fail,
}
