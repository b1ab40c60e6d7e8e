//! Error types for the collector and publisher jobs
//!
//! Every failure is either scoped to one unit of work (a brand, a catalog
//! entry, an image file) or fatal for the whole run. The publisher aborts on
//! an upload error that is not `is_recoverable`; the collector only meets
//! fatal errors while it is being built.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unexpected catalog file name '{file_name}', expected '<brand>{suffix}'")]
    UnexpectedCatalogName { file_name: String, suffix: String },

    #[error("Catalog file {path:?} could not be read: {source}")]
    CatalogUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No product blocks matching '{selector}' found")]
    NoProductBlocks { selector: String },

    #[error("Image locator '{locator}' cannot be resolved: {reason}")]
    UnresolvableLocator { locator: String, reason: String },

    #[error("HTTP request failed with status {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Transport failure for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O failure on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload of '{public_id}' rejected with status {status}: {message}")]
    UploadRejected {
        public_id: String,
        status: u16,
        message: String,
    },

    #[error("Upload of '{public_id}' returned no secure URL")]
    MissingSecureUrl { public_id: String },

    #[error("Record store {path:?} is malformed: {source}")]
    RecordStoreMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record store {path:?} could not be written: {source}")]
    RecordStoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PipelineError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a reqwest error for the given URL
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the run can carry on with the next unit of work
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::UnexpectedCatalogName { .. }
            | Self::CatalogUnreadable { .. }
            | Self::NoProductBlocks { .. }
            | Self::UnresolvableLocator { .. }
            | Self::HttpStatus { .. }
            | Self::Transport { .. }
            | Self::Io { .. }
            | Self::UploadRejected { .. }
            | Self::MissingSecureUrl { .. }
            | Self::RecordStoreWrite { .. } => true,
            Self::InvalidSelector { .. }
            | Self::RecordStoreMalformed { .. }
            | Self::Configuration { .. } => false,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
