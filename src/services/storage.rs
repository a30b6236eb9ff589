//! Client for the object store holding uploaded blobs.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};
use url::Url;

use crate::pipeline::error::PipelineError;

/// Blob download by bucket and object path.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn fetch(&self, bucket: &str, object: &str) -> Result<Vec<u8>, PipelineError>;
}

/// GCS-style JSON API client: `GET {base}/b/{bucket}/o/{object}?alt=media`.
#[derive(Clone)]
pub struct GcsObjectStore {
    client: Client,
    base_url: Url,
    token: String,
}

impl GcsObjectStore {
    pub fn new(base_url: &str, token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid object store URL")?;

        tracing::info!(base_url = %base_url, "Object store client initialized");

        Ok(Self { client, base_url, token: token.to_string() })
    }

    fn object_url(&self, bucket: &str, object: &str) -> Result<Url, PipelineError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PipelineError::Storage("object store URL cannot be a base".to_string()))?
            .push("b")
            .push(bucket)
            .push("o")
            // A single segment push percent-encodes the slashes in the
            // object path, which is what the JSON API expects.
            .push(object);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    #[instrument(skip(self))]
    async fn fetch(&self, bucket: &str, object: &str) -> Result<Vec<u8>, PipelineError> {
        let url = self.object_url(bucket, object)?;

        debug!(url = %url, "Object download");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Object store request failed");
                PipelineError::Storage(format!("object store unavailable: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, bucket = bucket, object = object, "Object download error");
            return Err(PipelineError::Storage(format!(
                "object {bucket}/{object} fetch returned {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Storage(format!("object body read failed: {e}")))?;

        Ok(bytes.to_vec())
    }
}
