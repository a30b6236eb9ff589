use std::sync::Arc;

use anyhow::Result;

use lexlens_backend::services::{GcsObjectStore, GeminiClient, RagCorpusClient, RestDocumentStore};
use lexlens_backend::{app, auth, config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting LexLens backend"
    );

    // Create clients for the external collaborators
    let objects = GcsObjectStore::new(
        &settings.storage_api_url,
        &settings.google_access_token,
        settings.service_timeout_seconds,
    )?;

    let store = RestDocumentStore::new(
        &settings.docstore_api_url,
        &settings.google_access_token,
        settings.service_timeout_seconds,
    )?;

    let model = GeminiClient::new(
        &settings.model_api_url,
        &settings.model_api_key,
        &settings.model_name,
        settings.model_timeout_seconds,
    )?;

    let corpus = RagCorpusClient::new(
        &settings.corpus_api_url,
        &settings.google_access_token,
        &settings.corpus_id,
        settings.model_timeout_seconds,
    )?;

    // Create JWKS cache for ID token verification
    let jwks_cache = auth::JwksCache::new(
        settings.identity_jwks_url.clone(),
        settings.identity_issuer.clone(),
        settings.identity_audience.clone(),
        settings.jwks_cache_ttl_seconds,
    );

    // Optionally warm the JWKS cache
    if let Err(e) = jwks_cache.warm_cache().await {
        tracing::warn!(error = %e, "Failed to warm JWKS cache - will fetch on first request");
    }

    // Create application state
    let state = app::AppState::new(
        settings.clone(),
        jwks_cache,
        Arc::new(objects),
        Arc::new(store),
        Arc::new(model),
        Arc::new(corpus),
    );

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
