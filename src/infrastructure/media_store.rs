//! Remote media store client
//!
//! Uploads go through the Cloudinary signed upload API: a multipart POST to
//! `{api_base}/v1_1/{cloud_name}/image/upload` carrying the file, the upload
//! parameters, the API key and a signature over the sorted parameters.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::infrastructure::config::{MediaStoreConfig, SignatureAlgorithm};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::pipeline_error::{PipelineError, PipelineResult};

/// One file to upload
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub file_path: &'a Path,
    /// Namespace the resource is stored under (the brand key)
    pub folder: &'a str,
    /// Stable resource name inside the folder
    pub public_id: &'a str,
    /// Replace an existing resource with the same folder and public id
    pub overwrite: bool,
}

/// What the store reports back for a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub secure_url: String,
    pub public_id: Option<String>,
}

/// Remote store receiving the collected images
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, request: &UploadRequest<'_>) -> PipelineResult<UploadedAsset>;
}

#[derive(Clone)]
struct Credentials {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    error: Option<UploadResponseError>,
}

#[derive(Debug, Deserialize)]
struct UploadResponseError {
    message: String,
}

/// Cloudinary upload client
#[derive(Debug, Clone)]
pub struct CloudinaryStore {
    client: Client,
    credentials: Credentials,
    api_base_url: String,
    signature_algorithm: SignatureAlgorithm,
}

impl CloudinaryStore {
    /// Build the client, failing when any credential is missing
    pub fn from_config(config: &MediaStoreConfig, http: &HttpClient) -> PipelineResult<Self> {
        let required = |value: &Option<String>, name: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    PipelineError::configuration(format!(
                        "media_store.{name} is not set (use BRAND_PIPELINE__MEDIA_STORE__{} or CLOUDINARY_URL)",
                        name.to_uppercase()
                    ))
                })
        };

        let credentials = Credentials {
            cloud_name: required(&config.cloud_name, "cloud_name")?,
            api_key: required(&config.api_key, "api_key")?,
            api_secret: required(&config.api_secret, "api_secret")?,
        };

        Ok(Self {
            client: http.client().clone(),
            credentials,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            signature_algorithm: config.signature_algorithm,
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base_url, self.credentials.cloud_name
        )
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, request: &UploadRequest<'_>) -> PipelineResult<UploadedAsset> {
        let bytes = tokio::fs::read(request.file_path)
            .await
            .map_err(|e| PipelineError::io(request.file_path, e))?;
        let file_name = request
            .file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(request.public_id)
            .to_string();

        let timestamp = Utc::now().timestamp().to_string();
        let overwrite = if request.overwrite { "true" } else { "false" };
        let params = [
            ("folder", request.folder),
            ("overwrite", overwrite),
            ("public_id", request.public_id),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign_params(
            &params,
            &self.credentials.api_secret,
            self.signature_algorithm,
        );

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", self.credentials.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value.to_string());
        }

        let url = self.upload_url();
        debug!("POST {} (public_id: {})", url, request.public_id);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::transport(url.as_str(), e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PipelineError::transport(url.as_str(), e))?;
        let parsed = serde_json::from_str::<UploadResponse>(&text).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|body| body.error)
                .map_or(text, |error| error.message);
            return Err(PipelineError::UploadRejected {
                public_id: request.public_id.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        match parsed {
            Some(UploadResponse {
                secure_url: Some(secure_url),
                public_id,
                ..
            }) => Ok(UploadedAsset {
                secure_url,
                public_id,
            }),
            _ => Err(PipelineError::MissingSecureUrl {
                public_id: request.public_id.to_string(),
            }),
        }
    }
}

/// `k1=v1&k2=v2...` over non-empty parameters sorted by key
pub fn string_to_sign(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex digest of the string to sign followed by the API secret
pub fn sign_params(params: &[(&str, &str)], api_secret: &str, algorithm: SignatureAlgorithm) -> String {
    let payload = format!("{}{}", string_to_sign(params), api_secret);
    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}
