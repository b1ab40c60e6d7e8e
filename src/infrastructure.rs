//! Infrastructure layer: configuration, logging, HTML parsing, HTTP, the
//! remote media store and the record file

pub mod config;
pub mod html_parser;
pub mod http_client;
pub mod logging;
pub mod media_store;
pub mod pipeline_error;
pub mod record_store;

// Re-export commonly used items
pub use config::{ConfigError, PipelineConfig};
pub use html_parser::{CatalogExtractor, ExtractedCatalog};
pub use http_client::{HttpClient, HttpClientConfig, ImageFetcher};
pub use logging::init_logging;
pub use media_store::{CloudinaryStore, MediaStore, UploadRequest, UploadedAsset};
pub use pipeline_error::{PipelineError, PipelineResult};
pub use record_store::RecordStore;
