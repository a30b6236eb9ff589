//! Client for the managed retrieval corpus.
//!
//! Two operations: register an uploaded file under its owning user and
//! document so later retrieval can be filtered to them, and run a
//! retrieval-augmented answer query with fixed retrieval parameters.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, instrument};

use crate::pipeline::error::PipelineError;

/// Snippets retrieved per query.
pub const RETRIEVAL_TOP_K: u32 = 10;
/// Maximum vector distance for a snippet to be considered relevant.
pub const RETRIEVAL_DISTANCE_THRESHOLD: f32 = 0.5;

/// The corpus as the pipeline sees it: ingest a file, answer a question.
#[async_trait]
pub trait RetrievalCorpus: Send + Sync {
    /// Registers a local file with the corpus. Returns the corpus's opaque
    /// handle for the import; the pipeline logs it and nothing more.
    async fn ingest_file(
        &self,
        path: &Path,
        display_name: &str,
        user_id: &str,
        doc_id: &str,
    ) -> Result<String, PipelineError>;

    /// Retrieval-augmented answer scoped to `user_id` and, when given, one
    /// document. `None` when retrieval produced no usable answer text.
    async fn answer(
        &self,
        query: &str,
        user_id: &str,
        doc_id: Option<&str>,
    ) -> Result<Option<String>, PipelineError>;
}

#[derive(Clone)]
pub struct RagCorpusClient {
    client: Client,
    base_url: String,
    token: String,
    corpus_id: String,
}

#[derive(Deserialize)]
struct ImportResponse {
    name: String,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    filter: QueryFilter<'a>,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "vectorDistanceThreshold")]
    vector_distance_threshold: f32,
}

#[derive(Serialize)]
struct QueryFilter<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(rename = "docId", skip_serializing_if = "Option::is_none")]
    doc_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    answer: Option<String>,
}

impl RagCorpusClient {
    pub fn new(base_url: &str, token: &str, corpus_id: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, corpus_id = corpus_id, "Corpus client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            corpus_id: corpus_id.to_string(),
        })
    }
}

#[async_trait]
impl RetrievalCorpus for RagCorpusClient {
    #[instrument(skip(self, path), fields(corpus = %self.corpus_id))]
    async fn ingest_file(
        &self,
        path: &Path,
        display_name: &str,
        user_id: &str,
        doc_id: &str,
    ) -> Result<String, PipelineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::IngestionFailure(format!("read spool file: {e}")))?;

        let metadata = json!({
            "displayName": display_name,
            "userId": user_id,
            "docId": doc_id,
        });

        let form = multipart::Form::new()
            .part(
                "metadata",
                multipart::Part::text(metadata.to_string()).mime_str("application/json").map_err(
                    |e| PipelineError::IngestionFailure(format!("metadata part: {e}")),
                )?,
            )
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(display_name.to_string()),
            );

        let url = format!("{}/v1beta/corpora/{}/files:upload", self.base_url, self.corpus_id);

        debug!(url = %url, display_name = display_name, "Corpus import request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Corpus import request failed");
                PipelineError::IngestionFailure(format!("corpus unavailable: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Corpus import error");
            return Err(PipelineError::IngestionFailure(format!("corpus returned {status}")));
        }

        let parsed: ImportResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::IngestionFailure(format!("invalid corpus response: {e}")))?;

        Ok(parsed.name)
    }

    #[instrument(skip(self, query), fields(corpus = %self.corpus_id))]
    async fn answer(
        &self,
        query: &str,
        user_id: &str,
        doc_id: Option<&str>,
    ) -> Result<Option<String>, PipelineError> {
        let url = format!("{}/v1beta/corpora/{}:query", self.base_url, self.corpus_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&QueryRequest {
                query,
                filter: QueryFilter { user_id, doc_id },
                top_k: RETRIEVAL_TOP_K,
                vector_distance_threshold: RETRIEVAL_DISTANCE_THRESHOLD,
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Corpus query request failed");
                PipelineError::Inference(format!("corpus unavailable: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Corpus query error");
            return Err(PipelineError::Inference(format!("corpus returned {status}")));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Inference(format!("invalid corpus response: {e}")))?;

        Ok(parsed.answer.filter(|a| !a.trim().is_empty()))
    }
}
