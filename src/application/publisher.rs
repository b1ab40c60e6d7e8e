//! Publisher job: brand image folders in, hosted URLs and a record file out
//!
//! A local file is deleted only after its upload succeeded and the record
//! store holding its URL has been rewritten.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::application::report::{BrandPublication, PublisherReport};
use crate::domain::{BrandKey, PublishedRecord, naming};
use crate::infrastructure::config::PipelineConfig;
use crate::infrastructure::media_store::{MediaStore, UploadRequest};
use crate::infrastructure::pipeline_error::{PipelineError, PipelineResult};
use crate::infrastructure::record_store::RecordStore;

pub struct Publisher<S> {
    root_dir: PathBuf,
    record_path: PathBuf,
    ignore_dirs: Vec<String>,
    image_extensions: Vec<String>,
    store: S,
}

impl<S: MediaStore> Publisher<S> {
    pub fn new(config: &PipelineConfig, store: S) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            record_path: config.record_file_path(),
            ignore_dirs: config.ignored_dir_names(),
            image_extensions: config.publisher.image_extensions.clone(),
            store,
        }
    }

    /// Upload every image under the brand directories.
    ///
    /// A malformed record store, an unreadable root or an unrecoverable
    /// upload error (a configuration error from the store) aborts the run; other
    /// per-file failures are reported and skipped.
    pub async fn run(&self) -> PipelineResult<PublisherReport> {
        let mut records = RecordStore::open(&self.record_path).await?;
        let mut report = PublisherReport::default();

        let brands = self.discover_brands().await?;
        if brands.is_empty() {
            warn!("No brand folders found in {:?}", self.root_dir);
            report.total_records = records.len();
            return Ok(report);
        }

        info!(
            "Found brand folders: {}",
            brands
                .iter()
                .map(BrandKey::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        for brand in &brands {
            let summary = self.publish_brand(brand, &mut records).await?;
            report.brands.push(summary);
        }

        report.total_records = records.len();
        info!("All folders processed. Records saved to {:?}", records.path());
        Ok(report)
    }

    /// Top-level directories under the root that are not ignored, by name
    pub async fn discover_brands(&self) -> PipelineResult<Vec<BrandKey>> {
        let mut entries = tokio::fs::read_dir(&self.root_dir)
            .await
            .map_err(|e| PipelineError::io(&self.root_dir, e))?;
        let mut brands = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipelineError::io(&self.root_dir, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if self.ignore_dirs.iter().any(|ignored| *ignored == name) {
                continue;
            }
            let is_dir = tokio::fs::metadata(entry.path())
                .await
                .is_ok_and(|m| m.is_dir());
            if is_dir {
                brands.push(BrandKey::from_directory(name));
            }
        }

        brands.sort();
        Ok(brands)
    }

    /// Publish one brand directory; only an unrecoverable error aborts it.
    async fn publish_brand(
        &self,
        brand: &BrandKey,
        records: &mut RecordStore,
    ) -> PipelineResult<BrandPublication> {
        info!("--- Processing folder: {} ---", brand);
        let mut summary = BrandPublication::new(brand);

        let files = match self.image_files(&self.root_dir.join(brand.as_str())).await {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot list folder {}: {}", brand, e);
                return Ok(summary);
            }
        };

        for file in files {
            match self.publish_file(brand, &file, records).await {
                Ok(deleted) => {
                    summary.uploaded += 1;
                    if !deleted {
                        summary.not_deleted += 1;
                    }
                }
                Err(e) if !e.is_recoverable() => return Err(e),
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        "  -> FAILED to upload {:?}: {}. Local file kept; re-run to retry.",
                        file, e
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Files in `dir` with a recognized image extension, by name
    async fn image_files(&self, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| PipelineError::io(dir, e))?;
        let mut files = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipelineError::io(dir, e))?
        {
            let path = entry.path();
            let recognized = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| naming::has_image_extension(n, &self.image_extensions));
            if recognized && path.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Upload one file, record it, then delete it.
    ///
    /// Returns whether the local file was deleted. An upload or record store
    /// failure is an error and leaves the file in place.
    pub async fn publish_file(
        &self,
        brand: &BrandKey,
        path: &Path,
        records: &mut RecordStore,
    ) -> PipelineResult<bool> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PipelineError::io(path, std::io::Error::other("file name is not UTF-8")))?;
        let identifier = naming::publish_identifier(file_name);

        info!("Uploading '{}' to folder '{}'...", file_name, brand);
        let asset = self
            .store
            .upload(&UploadRequest {
                file_path: path,
                folder: brand.as_str(),
                public_id: identifier,
                overwrite: true,
            })
            .await?;

        records
            .append(PublishedRecord::from_upload(brand, identifier, asset.secure_url.as_str()))
            .await?;
        info!("  -> Success! URL: {}", asset.secure_url);

        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!("  -> Deleted local file: {:?}", path);
                Ok(true)
            }
            Err(e) => {
                warn!(
                    "  -> Recorded {:?} but could not delete it: {}. A re-run will record it again.",
                    path, e
                );
                Ok(false)
            }
        }
    }
}
