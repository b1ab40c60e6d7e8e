//! Configuration infrastructure
//!
//! Settings are layered, lowest priority first:
//! 1. Built-in defaults (see [`defaults`])
//! 2. An optional config file (`brand-pipeline.toml` in the working directory,
//!    or `<config dir>/brand-image-pipeline/config.toml`)
//! 3. `BRAND_PIPELINE__*` environment variables, `.env` included
//! 4. `CLOUDINARY_URL` for media store credentials not set by the layers above
//!
//! Relative paths are resolved against `root_dir`.

#![allow(clippy::derivable_impls)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Prefix of environment variables read into the configuration
pub const ENV_PREFIX: &str = "BRAND_PIPELINE";

/// `cloudinary://<api_key>:<api_secret>@<cloud_name>`
pub const CLOUDINARY_URL_VAR: &str = "CLOUDINARY_URL";

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "brand-pipeline.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid CLOUDINARY_URL: {message}")]
    CloudinaryUrl { message: String },
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding brand folders, the record file and logs
    pub root_dir: PathBuf,

    pub collector: CollectorConfig,

    pub publisher: PublisherConfig,

    pub media_store: MediaStoreConfig,

    pub http: HttpConfig,

    pub logging: LoggingConfig,
}

/// Catalog pages and the markup contract used to read them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Catalog file names, processed in order
    pub catalogs: Vec<String>,

    /// Where catalog files live; `root_dir` when unset
    pub catalog_dir: Option<PathBuf>,

    /// Suffix stripped from a catalog file name to get its brand
    pub catalog_suffix: String,

    /// CSS selector of one product block
    pub product_container_selector: String,

    /// CSS selector of the image element inside a block
    pub image_selector: String,

    /// Attribute carrying the image locator
    pub locator_attribute: String,

    /// Attribute carrying the product display name
    pub name_attribute: String,

    /// Extension used when the locator has none
    pub default_extension: String,

    /// Base URL for relative image locators
    pub base_url: Option<String>,
}

/// Brand folder discovery and the record file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Record file; relative paths are under `root_dir`
    pub record_file: PathBuf,

    /// Top-level directories that are never brands
    pub ignore_dirs: Vec<String>,

    /// Recognized image extensions, without the dot
    pub image_extensions: Vec<String>,
}

/// Digest used to sign upload requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
}

/// Remote media store access
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaStoreConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,

    /// API endpoint, overridable for testing against a local server
    pub api_base_url: String,

    pub signature_algorithm: SignatureAlgorithm,
}

/// Shared HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,

    /// Request timeout; the transport default applies when unset
    pub request_timeout_seconds: Option<u64>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console (stdout) output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; relative paths are under `root_dir`
    pub log_dir: PathBuf,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(defaults::ROOT_DIR),
            collector: CollectorConfig::default(),
            publisher: PublisherConfig::default(),
            media_store: MediaStoreConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            catalogs: defaults::BRANDS
                .iter()
                .map(|brand| format!("{brand}{}", defaults::CATALOG_SUFFIX))
                .collect(),
            catalog_dir: None,
            catalog_suffix: defaults::CATALOG_SUFFIX.to_string(),
            product_container_selector: defaults::PRODUCT_CONTAINER_SELECTOR.to_string(),
            image_selector: defaults::IMAGE_SELECTOR.to_string(),
            locator_attribute: defaults::LOCATOR_ATTRIBUTE.to_string(),
            name_attribute: defaults::NAME_ATTRIBUTE.to_string(),
            default_extension: defaults::DEFAULT_EXTENSION.to_string(),
            base_url: None,
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            record_file: PathBuf::from(defaults::RECORD_FILE),
            ignore_dirs: defaults::IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
            image_extensions: defaults::IMAGE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for MediaStoreConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            api_base_url: defaults::MEDIA_API_BASE_URL.to_string(),
            signature_algorithm: SignatureAlgorithm::Sha1,
        }
    }
}

impl fmt::Debug for MediaStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStoreConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            request_timeout_seconds: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: PathBuf::from(defaults::LOG_DIR),
            max_files: defaults::LOG_MAX_FILES,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("hyper_util".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl PipelineConfig {
    /// Load the configuration the binary runs with.
    ///
    /// `explicit_file` must exist when given; otherwise the default locations
    /// are tried and silently skipped when absent.
    pub fn load(explicit_file: Option<&Path>) -> Result<Self, ConfigError> {
        // A missing .env is the normal case
        let _ = dotenvy::dotenv();

        let (file, required) = match explicit_file {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (default_config_file(), false),
        };

        let mut config = Self::from_sources(file.as_deref(), required, None)?;

        if let Ok(raw) = std::env::var(CLOUDINARY_URL_VAR) {
            config.media_store.fill_from_cloudinary_url(&raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from an optional file plus environment variables.
    ///
    /// `env` replaces the process environment when given.
    pub fn from_sources(
        file: Option<&Path>,
        file_required: bool,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(file_required));
        }

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("collector.catalogs")
            .with_list_parse_key("publisher.ignore_dirs")
            .with_list_parse_key("publisher.image_extensions")
            .try_parsing(true)
            .source(env);

        let settings = builder.add_source(environment).build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Reject settings the jobs cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("collector.catalog_suffix", &self.collector.catalog_suffix),
            (
                "collector.product_container_selector",
                &self.collector.product_container_selector,
            ),
            ("collector.image_selector", &self.collector.image_selector),
            ("collector.locator_attribute", &self.collector.locator_attribute),
            ("collector.name_attribute", &self.collector.name_attribute),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    message: format!("{name} must not be empty"),
                });
            }
        }

        let extension = self.collector.default_extension.trim_start_matches('.');
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation {
                message: format!(
                    "collector.default_extension '{}' must be alphanumeric",
                    self.collector.default_extension
                ),
            });
        }

        if self.publisher.image_extensions.is_empty() {
            return Err(ConfigError::Validation {
                message: "publisher.image_extensions must list at least one extension".to_string(),
            });
        }

        if let Some(base_url) = &self.collector.base_url {
            Url::parse(base_url).map_err(|e| ConfigError::Validation {
                message: format!("collector.base_url '{base_url}' is not a valid URL: {e}"),
            })?;
        }

        Ok(())
    }

    /// Directory catalog files are read from
    pub fn catalog_dir(&self) -> PathBuf {
        match &self.collector.catalog_dir {
            Some(dir) => self.resolve(dir),
            None => self.root_dir.clone(),
        }
    }

    /// Location of the record file
    pub fn record_file_path(&self) -> PathBuf {
        self.resolve(&self.publisher.record_file)
    }

    /// Location of the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Directory names the publisher never treats as brands.
    ///
    /// The log directory is included when it sits directly under the root.
    pub fn ignored_dir_names(&self) -> Vec<String> {
        let mut names = self.publisher.ignore_dirs.clone();
        let log_dir = self.log_dir();
        if log_dir.parent() == Some(self.root_dir.as_path()) {
            if let Some(name) = log_dir.file_name().and_then(|n| n.to_str()) {
                if !names.iter().any(|existing| existing == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }
}

impl MediaStoreConfig {
    /// Fill credentials that are still unset from a `cloudinary://` URL
    pub fn fill_from_cloudinary_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        let url = Url::parse(raw.trim()).map_err(|e| ConfigError::CloudinaryUrl {
            message: e.to_string(),
        })?;

        if url.scheme() != "cloudinary" {
            return Err(ConfigError::CloudinaryUrl {
                message: format!("unexpected scheme '{}'", url.scheme()),
            });
        }

        let cloud_name = url.host_str().filter(|h| !h.is_empty());
        let api_key = Some(url.username()).filter(|u| !u.is_empty());
        let api_secret = url.password().filter(|p| !p.is_empty());

        if self.cloud_name.is_none() {
            self.cloud_name = cloud_name.map(str::to_string);
        }
        if self.api_key.is_none() {
            self.api_key = api_key.map(str::to_string);
        }
        if self.api_secret.is_none() {
            self.api_secret = api_secret.map(str::to_string);
        }

        Ok(())
    }
}

fn default_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("brand-image-pipeline").join("config.toml"))
        .filter(|path| path.exists())
}

/// Default configuration values
pub mod defaults {
    /// Working root for brand folders, the record file and logs
    pub const ROOT_DIR: &str = ".";

    /// Brands with a saved catalog page
    pub const BRANDS: &[&str] = &[
        "apple", "samsung", "xiaomi", "vivo", "oneplus", "oppo", "google", "realme", "motorola",
        "iqoo", "poco", "tecno", "nothing", "nokia", "honor", "asus",
    ];

    pub const CATALOG_SUFFIX: &str = "_page.html";

    pub const PRODUCT_CONTAINER_SELECTOR: &str = "div.select_product_list_blk";

    pub const IMAGE_SELECTOR: &str = "img.product-image";

    pub const LOCATOR_ATTRIBUTE: &str = "src";

    pub const NAME_ATTRIBUTE: &str = "alt";

    pub const DEFAULT_EXTENSION: &str = "webp";

    pub const RECORD_FILE: &str = "uploaded_media.json";

    pub const IGNORE_DIRS: &[&str] = &["__pycache__", ".venv", ".git"];

    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "avif"];

    pub const MEDIA_API_BASE_URL: &str = "https://api.cloudinary.com";

    pub const USER_AGENT: &str = concat!("brand-image-pipeline/", env!("CARGO_PKG_VERSION"));

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = true;

    pub const LOG_DIR: &str = "logs";

    pub const LOG_MAX_FILES: u32 = 5;
}
