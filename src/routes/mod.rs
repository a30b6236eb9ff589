pub mod health;
pub mod process;
pub mod query;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Upload-event trigger (called by the storage-event forwarder)
        .route("/process", post(process::process_document))
        // Authenticated document QA
        .route("/query", post(query::query_document))
}
