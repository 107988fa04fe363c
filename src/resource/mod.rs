pub mod file;

use crate::config::types::{Config, ResourceConfigEntry, ResourceType};
use crate::filter::OutputRecord;
use crate::record::RawRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub use file::FileResource;

/// A named upstream or downstream system records are read from or written to.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Pull every record currently in a collection.
    async fn records(&self, collection: &str) -> Result<Vec<RawRecord>, ResourceError>;

    /// Write a batch of records to a collection.
    async fn write(
        &self,
        records: &[OutputRecord],
        collection: &str,
        options: &[ResourceConfigEntry],
    ) -> Result<(), ResourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("unknown resource '{0}'")]
    NotFound(String),

    #[error("resource '{resource}': collection '{collection}' not found")]
    CollectionNotFound { resource: String, collection: String },

    #[error("resource '{resource}': {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("resource '{resource}': malformed output record: {source}")]
    Serialize {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Registry of named resources.
#[derive(Default, Clone)]
pub struct Resources {
    by_name: HashMap<String, Arc<dyn Resource>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a handle for every resource declared in config.
    pub fn from_config(config: &Config) -> Self {
        let mut resources = Self::new();
        for (name, definition) in &config.resources {
            let resource: Arc<dyn Resource> = match definition.resource_type {
                ResourceType::File => Arc::new(FileResource::new(name.clone(), &definition.path)),
            };
            resources.insert(name.clone(), resource);
        }
        resources
    }

    pub fn insert(&mut self, name: impl Into<String>, resource: Arc<dyn Resource>) {
        self.by_name.insert(name.into(), resource);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Resource>, ResourceError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))
    }
}
