//! HTTP client for downloading catalog images
//!
//! Images are streamed to a `.part` sibling of the destination and renamed
//! into place once the body is complete, so an interrupted transfer never
//! leaves a truncated image behind.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::infrastructure::config::HttpConfig;
use crate::infrastructure::pipeline_error::{PipelineError, PipelineResult};

/// HTTP client configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: Option<u64>,
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from the shared HTTP settings
    pub fn from_http_config(http: &HttpConfig) -> Self {
        Self {
            user_agent: http.user_agent.clone(),
            timeout_seconds: http.request_timeout_seconds,
            follow_redirects: true,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_http_config(&HttpConfig::default())
    }
}

/// Downloads one image to a file
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Stream `url` into `destination`, replacing any existing file.
    /// Returns the number of bytes written.
    async fn fetch_to_file(&self, url: &Url, destination: &Path) -> PipelineResult<u64>;
}

/// reqwest-backed client shared by the downloader and the media store
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> PipelineResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| {
                PipelineError::configuration(format!("Invalid user agent: {e}"))
            })?,
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            });
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let client = builder.build().map_err(|e| {
            PipelineError::configuration(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self { client, config })
    }

    /// Underlying reqwest client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl ImageFetcher for HttpClient {
    async fn fetch_to_file(&self, url: &Url, destination: &Path) -> PipelineResult<u64> {
        info!("Fetching image: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PipelineError::transport(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(PipelineError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let partial = partial_path(destination);
        match write_body(response, url, &partial).await {
            Ok(written) => {
                tokio::fs::rename(&partial, destination)
                    .await
                    .map_err(|e| PipelineError::io(destination, e))?;
                debug!("Saved {} bytes to {:?}", written, destination);
                Ok(written)
            }
            Err(e) => {
                // Best effort; the write error is what gets reported
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }
}

async fn write_body(response: Response, url: &Url, path: &Path) -> PipelineResult<u64> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| PipelineError::transport(url.as_str(), e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| PipelineError::io(path, e))?;
    Ok(written)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Turn an image locator from a catalog page into a fetchable URL.
///
/// Absolute URLs are used as-is, protocol-relative ones (`//host/path`) get
/// `https:`, and anything else needs `base` to resolve against.
pub fn resolve_locator(locator: &str, base: Option<&Url>) -> PipelineResult<Url> {
    if let Ok(url) = Url::parse(locator) {
        return Ok(url);
    }

    let unresolvable = |reason: String| PipelineError::UnresolvableLocator {
        locator: locator.to_string(),
        reason,
    };

    if locator.starts_with("//") {
        return Url::parse(&format!("https:{locator}")).map_err(|e| unresolvable(e.to_string()));
    }

    match base {
        Some(base) => base.join(locator).map_err(|e| unresolvable(e.to_string())),
        None => Err(unresolvable(
            "relative locator and no collector.base_url configured".to_string(),
        )),
    }
}
