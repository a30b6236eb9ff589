use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    #[allow(dead_code)]
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Cloud project
    pub project_id: String,
    pub region: String,

    // Identity provider (ID token verification)
    pub identity_jwks_url: String,
    pub identity_issuer: String,
    pub identity_audience: String,
    pub jwks_cache_ttl_seconds: u64,

    // Generative model service
    pub model_api_url: String,
    pub model_api_key: String,
    pub model_name: String,
    pub model_timeout_seconds: u64,

    // Retrieval corpus
    pub corpus_api_url: String,
    pub corpus_id: String,

    // Object store (uploaded blobs)
    pub storage_api_url: String,

    // Document database (per-user document records)
    pub docstore_api_url: String,

    // Shared bearer token for the cloud APIs (storage, corpus, records)
    pub google_access_token: String,

    // Timeout for the non-model service calls
    pub service_timeout_seconds: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Cloud project
        let project_id = env::var("GCP_PROJECT").context("GCP_PROJECT must be set")?;
        let region = env::var("GCP_REGION").unwrap_or_else(|_| "us-central1".to_string());

        // Identity provider
        let identity_jwks_url = env::var("IDENTITY_JWKS_URL").unwrap_or_else(|_| {
            "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
                .to_string()
        });
        let identity_issuer = env::var("IDENTITY_ISSUER")
            .unwrap_or_else(|_| format!("https://securetoken.google.com/{project_id}"));
        let identity_audience =
            env::var("IDENTITY_AUDIENCE").unwrap_or_else(|_| project_id.clone());
        let jwks_cache_ttl_seconds = env::var("JWKS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1800); // 30 minutes default

        // Generative model service
        let model_api_url = env::var("MODEL_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let model_api_key = env::var("MODEL_API_KEY").context("MODEL_API_KEY must be set")?;
        let model_name = env::var("MODEL_NAME").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let model_timeout_seconds = env::var("MODEL_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120); // 2 minutes default for LLM calls

        // Retrieval corpus
        let corpus_api_url = env::var("CORPUS_API_URL")
            .unwrap_or_else(|_| format!("https://{region}-aiplatform.googleapis.com"));
        let corpus_id = env::var("RAG_CORPUS_ID").context("RAG_CORPUS_ID must be set")?;

        // Object store
        let storage_api_url = env::var("STORAGE_API_URL")
            .unwrap_or_else(|_| "https://storage.googleapis.com/storage/v1".to_string());

        // Document database
        let docstore_api_url =
            env::var("DOCSTORE_API_URL").context("DOCSTORE_API_URL must be set")?;

        // Cloud API credentials
        let google_access_token =
            env::var("GOOGLE_ACCESS_TOKEN").context("GOOGLE_ACCESS_TOKEN must be set")?;

        let service_timeout_seconds = env::var("SERVICE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Settings {
            env,
            server_addr,
            project_id,
            region,
            identity_jwks_url,
            identity_issuer,
            identity_audience,
            jwks_cache_ttl_seconds,
            model_api_url,
            model_api_key,
            model_name,
            model_timeout_seconds,
            corpus_api_url,
            corpus_id,
            storage_api_url,
            docstore_api_url,
            google_access_token,
            service_timeout_seconds,
        })
    }
}
