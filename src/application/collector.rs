//! Collector job: saved catalog pages in, brand image folders out
//!
//! Catalogs are processed one at a time and entries one at a time. A failure
//! only ever skips the catalog or the entry it happened in.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

use crate::application::report::{BrandCollection, CollectorReport, SkippedCatalog};
use crate::domain::{BrandKey, ProductEntry};
use crate::infrastructure::config::{CollectorConfig, PipelineConfig};
use crate::infrastructure::html_parser::CatalogExtractor;
use crate::infrastructure::http_client::{ImageFetcher, resolve_locator};
use crate::infrastructure::pipeline_error::{PipelineError, PipelineResult};

pub struct Collector<F> {
    config: CollectorConfig,
    root_dir: PathBuf,
    catalog_dir: PathBuf,
    base_url: Option<Url>,
    extractor: CatalogExtractor,
    fetcher: F,
}

impl<F: ImageFetcher> Collector<F> {
    pub fn new(config: &PipelineConfig, fetcher: F) -> PipelineResult<Self> {
        let base_url = config
            .collector
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| PipelineError::configuration(format!("Invalid collector.base_url: {e}")))?;

        Ok(Self {
            config: config.collector.clone(),
            root_dir: config.root_dir.clone(),
            catalog_dir: config.catalog_dir(),
            base_url,
            extractor: CatalogExtractor::new(&config.collector)?,
            fetcher,
        })
    }

    /// Process every configured catalog
    pub async fn run(&self) -> CollectorReport {
        self.run_catalogs(&self.config.catalogs).await
    }

    /// Process the given catalogs in order
    pub async fn run_catalogs(&self, catalogs: &[String]) -> CollectorReport {
        let mut report = CollectorReport::default();

        for catalog in catalogs {
            match self.collect_catalog(catalog).await {
                Ok(summary) => report.brands.push(summary),
                Err(e) => {
                    warn!("Skipping '{}': {}", catalog, e);
                    report.skipped_catalogs.push(SkippedCatalog {
                        catalog: catalog.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("All catalogs processed");
        report
    }

    /// Download every product image of one catalog into its brand directory
    pub async fn collect_catalog(&self, catalog: &str) -> PipelineResult<BrandCollection> {
        let brand = BrandKey::from_catalog_file(catalog, &self.config.catalog_suffix).ok_or_else(
            || PipelineError::UnexpectedCatalogName {
                file_name: catalog.to_string(),
                suffix: self.config.catalog_suffix.clone(),
            },
        )?;
        info!("--- Processing brand: {} ---", brand);

        let brand_dir = self.root_dir.join(brand.as_str());
        let existed = brand_dir.is_dir();
        tokio::fs::create_dir_all(&brand_dir)
            .await
            .map_err(|e| PipelineError::io(&brand_dir, e))?;
        if !existed {
            info!("Created directory: {:?}", brand_dir);
        }

        let catalog_path = self.catalog_dir.join(catalog);
        let document = tokio::fs::read_to_string(&catalog_path)
            .await
            .map_err(|source| PipelineError::CatalogUnreadable {
                path: catalog_path.clone(),
                source,
            })?;

        let extracted = self.extractor.extract(&document)?;
        info!(
            "Found {} models for {}. Starting download...",
            extracted.blocks, brand
        );

        let mut summary = BrandCollection {
            brand: brand.to_string(),
            found: extracted.blocks,
            skipped_entries: extracted.rejected,
            ..BrandCollection::default()
        };

        for entry in &extracted.entries {
            match self.collect_entry(&brand_dir, entry).await {
                Ok(_) => summary.downloaded += 1,
                Err(e) => {
                    summary.failed += 1;
                    warn!("Failed to download '{}': {}", entry.display_name, e);
                }
            }
        }

        Ok(summary)
    }

    async fn collect_entry(&self, brand_dir: &Path, entry: &ProductEntry) -> PipelineResult<PathBuf> {
        let file_name = entry.file_name(&self.config.default_extension);
        let url = resolve_locator(&entry.locator, self.base_url.as_ref())?;
        let destination = brand_dir.join(&file_name);

        info!("Downloading '{}' -> '{}'...", entry.display_name, file_name);
        self.fetcher.fetch_to_file(&url, &destination).await?;

        Ok(destination)
    }
}
