use axum::Router;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::JwksCache;
use crate::config::Settings;
use crate::middleware::request_id_layer;
use crate::pipeline::ActiveDocuments;
use crate::routes;
use crate::services::{DocumentStore, ObjectStore, RetrievalCorpus, TextModel};

/// Shared application state
///
/// The four external collaborators are held behind their traits so tests
/// can assemble the app with in-memory fakes.
pub struct AppState {
    pub settings: Settings,
    pub jwks_cache: JwksCache,
    pub objects: Arc<dyn ObjectStore>,
    pub store: Arc<dyn DocumentStore>,
    pub model: Arc<dyn TextModel>,
    pub corpus: Arc<dyn RetrievalCorpus>,
    /// Documents currently being processed; second triggers for the same
    /// document are refused while the first is in flight.
    pub active: ActiveDocuments,
}

impl AppState {
    pub fn new(
        settings: Settings,
        jwks_cache: JwksCache,
        objects: Arc<dyn ObjectStore>,
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn TextModel>,
        corpus: Arc<dyn RetrievalCorpus>,
    ) -> Arc<Self> {
        Arc::new(Self {
            settings,
            jwks_cache,
            objects,
            store,
            model,
            corpus,
            active: ActiveDocuments::new(),
        })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    // Build CORS layer
    let cors = build_cors_layer();

    // Build trace layer (use DEBUG for spans to reduce overhead at INFO level)
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    // Request ID layers
    let (set_request_id, propagate_request_id) = request_id_layer();

    // Build router (routes at root level, no /api prefix)
    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .with_state(state)
}

/// All origins are permitted: the upload widget is embedded on customer
/// sites we don't control. Credentials stay off accordingly; the bearer
/// token travels in the Authorization header.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-request-id"),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}
