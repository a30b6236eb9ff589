//! Client for the document database holding per-user document records.
//!
//! Records live at `users/{userId}/documents/{docId}`. The pipeline only
//! ever merge-patches existing records; creation happens at upload time,
//! outside this service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};

use crate::domain::DocumentPatch;
use crate::pipeline::error::PipelineError;

/// Merge-patch a document record.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn update_document(
        &self,
        user_id: &str,
        doc_id: &str,
        patch: &DocumentPatch,
    ) -> Result<(), PipelineError>;
}

#[derive(Clone)]
pub struct RestDocumentStore {
    client: Client,
    base_url: String,
    token: String,
}

impl RestDocumentStore {
    pub fn new(base_url: &str, token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "Document store client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    #[instrument(skip(self, patch))]
    async fn update_document(
        &self,
        user_id: &str,
        doc_id: &str,
        patch: &DocumentPatch,
    ) -> Result<(), PipelineError> {
        let url = format!("{}/users/{}/documents/{}", self.base_url, user_id, doc_id);

        debug!(url = %url, status = ?patch.upload_status, "Document record update");

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .json(patch)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Document store request failed");
                PipelineError::Persistence(format!("document store unavailable: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Document store error");
            return Err(PipelineError::Persistence(format!(
                "record {user_id}/{doc_id} update returned {status}"
            )));
        }

        Ok(())
    }
}
