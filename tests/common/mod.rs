#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use url::Url;

use brand_image_pipeline_lib::infrastructure::{
    ImageFetcher, MediaStore, PipelineConfig, PipelineError, PipelineResult, UploadRequest,
    UploadedAsset,
};

pub fn config_for(root: &Path) -> PipelineConfig {
    PipelineConfig {
        root_dir: root.to_path_buf(),
        ..PipelineConfig::default()
    }
}

pub fn product_block(name: &str, src: &str) -> String {
    format!(
        r#"<div class="select_product_list_blk"><a href="/p"><img class="product-image" src="{src}" alt="{name}"></a></div>"#
    )
}

pub fn catalog_page(blocks: &[String]) -> String {
    format!("<html><body><main>{}</main></body></html>", blocks.join("\n"))
}

/// Writes the URL itself as the image body; fails with 404 for listed URLs
#[derive(Default)]
pub struct FakeFetcher {
    pub failing: HashSet<String>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch_to_file(&self, url: &Url, destination: &Path) -> PipelineResult<u64> {
        self.requested.lock().unwrap().push(url.to_string());
        if self.failing.contains(url.as_str()) {
            return Err(PipelineError::HttpStatus {
                status: 404,
                url: url.to_string(),
            });
        }
        let body = url.as_str().as_bytes();
        std::fs::write(destination, body).map_err(|e| PipelineError::io(destination, e))?;
        Ok(body.len() as u64)
    }
}

/// Accepts uploads in memory; rejects the listed public ids
///
/// `pinned` ids get their local file swapped for an empty directory of the
/// same name after upload, so the publisher cannot delete it.
/// `misconfigured` fails every upload with a configuration error.
#[derive(Default)]
pub struct FakeStore {
    pub rejecting: HashSet<String>,
    pub pinned: HashSet<String>,
    pub misconfigured: bool,
    pub uploads: Mutex<Vec<(String, String)>>,
}

impl FakeStore {
    pub fn rejecting(public_ids: &[&str]) -> Self {
        Self {
            rejecting: public_ids.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn pinning(public_ids: &[&str]) -> Self {
        Self {
            pinned: public_ids.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn misconfigured() -> Self {
        Self {
            misconfigured: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

pub fn hosted_url(folder: &str, public_id: &str) -> String {
    format!("https://res.example.com/demo/image/upload/{folder}/{public_id}")
}

#[async_trait]
impl MediaStore for FakeStore {
    async fn upload(&self, request: &UploadRequest<'_>) -> PipelineResult<UploadedAsset> {
        assert!(request.overwrite, "uploads must overwrite");
        assert!(request.file_path.exists(), "file must exist while uploading");

        if self.misconfigured {
            return Err(PipelineError::configuration("media_store.api_key is not set"));
        }

        if self.rejecting.contains(request.public_id) {
            return Err(PipelineError::UploadRejected {
                public_id: request.public_id.to_string(),
                status: 500,
                message: "simulated failure".to_string(),
            });
        }

        self.uploads
            .lock()
            .unwrap()
            .push((request.folder.to_string(), request.public_id.to_string()));

        if self.pinned.contains(request.public_id) {
            std::fs::remove_file(request.file_path).unwrap();
            std::fs::create_dir(request.file_path).unwrap();
        }

        Ok(UploadedAsset {
            secure_url: hosted_url(request.folder, request.public_id),
            public_id: Some(format!("{}/{}", request.folder, request.public_id)),
        })
    }
}
