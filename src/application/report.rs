//! Per-run summaries of the collector and publisher jobs

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::BrandKey;

/// Outcome of one catalog page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrandCollection {
    pub brand: String,
    /// Product blocks found in the page
    pub found: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// Blocks without a locator or a display name
    pub skipped_entries: usize,
}

/// A catalog that was skipped as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCatalog {
    pub catalog: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectorReport {
    pub brands: Vec<BrandCollection>,
    pub skipped_catalogs: Vec<SkippedCatalog>,
}

impl CollectorReport {
    pub fn total_downloaded(&self) -> usize {
        self.brands.iter().map(|b| b.downloaded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.brands.iter().map(|b| b.failed).sum()
    }

    pub fn brand(&self, brand: &str) -> Option<&BrandCollection> {
        self.brands.iter().find(|b| b.brand == brand)
    }

    pub fn log_summary(&self) {
        info!("=== Collection summary ===");
        for brand in &self.brands {
            info!(
                "{}: {} found, {} downloaded, {} failed, {} skipped",
                brand.brand, brand.found, brand.downloaded, brand.failed, brand.skipped_entries
            );
        }
        for skipped in &self.skipped_catalogs {
            warn!("{}: skipped ({})", skipped.catalog, skipped.reason);
        }
        info!(
            "Downloaded {} images, {} failed, {} catalogs skipped",
            self.total_downloaded(),
            self.total_failed(),
            self.skipped_catalogs.len()
        );
    }
}

/// Outcome of one brand directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrandPublication {
    pub brand: String,
    pub uploaded: usize,
    pub failed: usize,
    /// Uploaded and recorded, but the local file could not be deleted
    pub not_deleted: usize,
}

impl BrandPublication {
    pub fn new(brand: &BrandKey) -> Self {
        Self {
            brand: brand.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PublisherReport {
    pub brands: Vec<BrandPublication>,
    /// Records in the store when the run finished
    pub total_records: usize,
}

impl PublisherReport {
    pub fn total_uploaded(&self) -> usize {
        self.brands.iter().map(|b| b.uploaded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.brands.iter().map(|b| b.failed).sum()
    }

    pub fn brand(&self, brand: &str) -> Option<&BrandPublication> {
        self.brands.iter().find(|b| b.brand == brand)
    }

    pub fn log_summary(&self) {
        info!("=== Publish summary ===");
        for brand in &self.brands {
            info!(
                "{}: {} uploaded, {} failed",
                brand.brand, brand.uploaded, brand.failed
            );
            if brand.not_deleted > 0 {
                warn!(
                    "{}: {} uploaded files are still on disk; a re-run will record them again",
                    brand.brand, brand.not_deleted
                );
            }
        }
        info!(
            "Uploaded {} images, {} failed, {} records in store",
            self.total_uploaded(),
            self.total_failed(),
            self.total_records
        );
    }
}
