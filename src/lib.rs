//! Brand Image Pipeline
//!
//! Two batch jobs run one after the other:
//! - **collect** reads saved catalog pages, extracts product images and
//!   stores them in one directory per brand
//! - **publish** uploads those images to the media host, appends each hosted
//!   URL to a JSON record file and removes the uploaded local copies

pub mod application;
pub mod domain;
pub mod infrastructure;

use tracing::info;

use crate::application::{Collector, CollectorReport, Publisher, PublisherReport};
use crate::infrastructure::{
    CloudinaryStore, HttpClient, HttpClientConfig, PipelineConfig, PipelineResult,
};

/// Run the collector with the production HTTP client
pub async fn run_collect(config: &PipelineConfig, catalogs: Option<&[String]>) -> PipelineResult<CollectorReport> {
    let http = HttpClient::new(HttpClientConfig::from_http_config(&config.http))?;
    let collector = Collector::new(config, http)?;

    info!("Collecting into {:?}", config.root_dir);
    let report = match catalogs {
        Some(catalogs) => collector.run_catalogs(catalogs).await,
        None => collector.run().await,
    };
    report.log_summary();
    Ok(report)
}

/// Run the publisher against the configured media store
pub async fn run_publish(config: &PipelineConfig) -> PipelineResult<PublisherReport> {
    let http = HttpClient::new(HttpClientConfig::from_http_config(&config.http))?;
    let store = CloudinaryStore::from_config(&config.media_store, &http)?;
    info!("Media store configured");

    let publisher = Publisher::new(config, store);
    let report = publisher.run().await?;
    report.log_summary();
    Ok(report)
}
