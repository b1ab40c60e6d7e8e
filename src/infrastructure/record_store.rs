//! Persisted list of published records
//!
//! The whole list is rewritten after every append: serialized to a sibling
//! temporary file and renamed over the store, so the store on disk is always
//! a complete, loadable document.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::PublishedRecord;
use crate::infrastructure::pipeline_error::{PipelineError, PipelineResult};

/// JSON file holding every record published so far
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<PublishedRecord>,
}

impl RecordStore {
    /// Load the store at `path`, or start empty when the file does not exist.
    ///
    /// Content that is not a list of `{brand, model, imageUrl}` records is a
    /// [`PipelineError::RecordStoreMalformed`].
    pub async fn open(path: impl Into<PathBuf>) -> PipelineResult<Self> {
        let path = path.into();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<Vec<PublishedRecord>>(&content).map_err(
                |source| PipelineError::RecordStoreMalformed {
                    path: path.clone(),
                    source,
                },
            )?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(PipelineError::io(&path, e)),
        };

        if records.is_empty() {
            debug!("Starting with an empty record store at {:?}", path);
        } else {
            info!("Loaded {} existing records from {:?}", records.len(), path);
        }

        Ok(Self { path, records })
    }

    /// Append a record and persist the full list.
    ///
    /// When the write fails the record is dropped again, keeping memory and
    /// disk in step.
    pub async fn append(&mut self, record: PublishedRecord) -> PipelineResult<()> {
        self.records.push(record);
        if let Err(e) = self.persist().await {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    pub fn records(&self) -> &[PublishedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> PipelineResult<()> {
        let write_error = |source| PipelineError::RecordStoreWrite {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(&self.records)
            .map_err(|e| write_error(std::io::Error::other(e)))?;

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(write_error)?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(write_error)?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
