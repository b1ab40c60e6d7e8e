//! HTML parsing and product extraction for saved catalog pages
//!
//! A catalog page lists products as repeated container blocks; each block
//! holds one image element whose attributes carry the image locator and the
//! product display name.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::domain::ProductEntry;
use crate::infrastructure::config::CollectorConfig;
use crate::infrastructure::pipeline_error::{PipelineError, PipelineResult};

/// Products found in one catalog page
#[derive(Debug, Clone, Default)]
pub struct ExtractedCatalog {
    /// Number of product blocks matched
    pub blocks: usize,
    /// Entries with both a locator and a display name
    pub entries: Vec<ProductEntry>,
    /// Blocks skipped for a missing image element or attribute
    pub rejected: usize,
}

/// Extracts product entries from catalog markup
#[derive(Debug)]
pub struct CatalogExtractor {
    container_selector: Selector,
    container_css: String,
    image_selector: Selector,
    locator_attribute: String,
    name_attribute: String,
}

impl CatalogExtractor {
    /// Create an extractor from the collector's markup settings
    pub fn new(config: &CollectorConfig) -> PipelineResult<Self> {
        Ok(Self {
            container_selector: parse_selector(&config.product_container_selector)?,
            container_css: config.product_container_selector.clone(),
            image_selector: parse_selector(&config.image_selector)?,
            locator_attribute: config.locator_attribute.clone(),
            name_attribute: config.name_attribute.clone(),
        })
    }

    /// Extract every product entry from a catalog document.
    ///
    /// Fails with [`PipelineError::NoProductBlocks`] when no container block
    /// matches; blocks with missing data are counted as rejected and skipped.
    pub fn extract(&self, document: &str) -> PipelineResult<ExtractedCatalog> {
        let html = Html::parse_document(document);
        let mut catalog = ExtractedCatalog::default();

        for (index, block) in html.select(&self.container_selector).enumerate() {
            catalog.blocks += 1;
            match self.extract_entry(block) {
                Some(entry) => catalog.entries.push(entry),
                None => {
                    catalog.rejected += 1;
                    warn!(
                        "Skipping product block #{} with a missing image locator or model name",
                        index + 1
                    );
                }
            }
        }

        if catalog.blocks == 0 {
            return Err(PipelineError::NoProductBlocks {
                selector: self.container_css.clone(),
            });
        }

        debug!(
            "Extracted {} entries from {} product blocks",
            catalog.entries.len(),
            catalog.blocks
        );
        Ok(catalog)
    }

    fn extract_entry(&self, block: ElementRef<'_>) -> Option<ProductEntry> {
        let image = block.select(&self.image_selector).next()?;
        let element = image.value();
        ProductEntry::from_attributes(
            element.attr(&self.name_attribute),
            element.attr(&self.locator_attribute),
        )
    }
}

fn parse_selector(css: &str) -> PipelineResult<Selector> {
    Selector::parse(css).map_err(|e| PipelineError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}
