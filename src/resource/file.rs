use super::{Resource, ResourceError};
use crate::config::types::ResourceConfigEntry;
use crate::filter::OutputRecord;
use crate::record::RawRecord;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// A directory of newline-delimited JSON collections.
///
/// Collection `name` lives at `<dir>/<name>.ndjson`. Each input line is one
/// raw record payload; each output record is appended as one JSON line.
#[derive(Debug, Clone)]
pub struct FileResource {
    name: String,
    dir: PathBuf,
}

#[derive(Serialize)]
struct StoredRecord<'a> {
    key: &'a str,
    timestamp: Option<String>,
    payload: String,
}

impl FileResource {
    pub fn new(name: impl Into<String>, dir: &Path) -> Self {
        Self {
            name: name.into(),
            dir: dir.to_path_buf(),
        }
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.ndjson", collection))
    }

    fn io_error(&self, source: std::io::Error) -> ResourceError {
        ResourceError::Io {
            resource: self.name.clone(),
            source,
        }
    }
}

#[async_trait]
impl Resource for FileResource {
    async fn records(&self, collection: &str) -> Result<Vec<RawRecord>, ResourceError> {
        let path = self.collection_path(collection);
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResourceError::CollectionNotFound {
                    resource: self.name.clone(),
                    collection: collection.to_string(),
                });
            }
            Err(e) => return Err(self.io_error(e)),
        };

        // One record per non-blank line
        let records: Vec<RawRecord> = contents
            .split(|b| *b == b'\n')
            .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
            .map(RawRecord::new)
            .collect();

        debug!(
            resource = %self.name,
            collection,
            count = records.len(),
            "Read records"
        );
        Ok(records)
    }

    async fn write(
        &self,
        records: &[OutputRecord],
        collection: &str,
        options: &[ResourceConfigEntry],
    ) -> Result<(), ResourceError> {
        // Serialize the whole batch up front so a bad record writes nothing
        let mut buf = Vec::new();
        for record in records {
            let stored = StoredRecord {
                key: &record.key,
                timestamp: record.timestamp.map(|ts| ts.to_rfc3339()),
                payload: String::from_utf8_lossy(&record.payload).into_owned(),
            };
            serde_json::to_writer(&mut buf, &stored).map_err(|e| ResourceError::Serialize {
                resource: self.name.clone(),
                source: e,
            })?;
            buf.push(b'\n');
        }

        // Create the resource directory on first write
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.io_error(e))?;

        // Append to the collection file
        let path = self.collection_path(collection);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(&buf).await.map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;

        // Delivery options are only logged
        let options: Vec<String> = options
            .iter()
            .map(|entry| format!("{}={}", entry.key, entry.value))
            .collect();
        info!(
            resource = %self.name,
            collection,
            count = records.len(),
            options = %options.join(","),
            "Wrote records"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_skip_blank_lines() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("events.ndjson"), "{\"a\":1}\n\n  \n{\"b\":2}").unwrap();
        let resource = FileResource::new("mdb", dir.path());

        let records = resource.records("events").await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload, b"{\"a\":1}");
        assert_eq!(records[1].payload, b"{\"b\":2}");
        assert!(records[0].key.is_none());
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let dir = TempDir::new().unwrap();
        let resource = FileResource::new("mdb", dir.path());

        let result = resource.records("events").await;

        assert!(matches!(result, Err(ResourceError::CollectionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_write_appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("cck");
        let resource = FileResource::new("cck", &out_dir);
        let record = OutputRecord {
            key: "u1".to_string(),
            payload: br#"{"user_id":"u1"}"#.to_vec(),
            timestamp: Utc.timestamp_opt(1700000000, 0).single(),
        };

        resource.write(&[record.clone()], "out", &[]).await.unwrap();
        resource.write(&[record], "out", &[]).await.unwrap();

        let contents = std::fs::read_to_string(out_dir.join("out.ndjson")).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["key"], "u1");
        assert_eq!(lines[0]["timestamp"], "2023-11-14T22:13:20+00:00");
        assert_eq!(lines[0]["payload"], r#"{"user_id":"u1"}"#);
    }
}
