//! Client for the hosted generative-model service.
//!
//! The pipeline needs exactly one capability from the model: turn a prompt
//! into text. Everything else (classification verdicts, insight JSON) is
//! prompt construction and parsing, which lives in the pipeline stages.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::pipeline::error::PipelineError;

/// Single-prompt text generation, injected into the pipeline stages so
/// tests can substitute a scripted model.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Client for a Gemini-style `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, model = model, "Model client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);

        debug!(url = %url, prompt_chars = prompt.len(), "Generation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: vec![RequestContent {
                    role: "user",
                    parts: vec![RequestPart { text: prompt }],
                }],
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Model request failed");
                PipelineError::Inference(format!("model service unavailable: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Model service error");
            return Err(PipelineError::Inference(format!("model service returned {status}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Inference(format!("invalid model response: {e}")))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(PipelineError::Inference("model returned no text".to_string()));
        }

        Ok(text)
    }
}
