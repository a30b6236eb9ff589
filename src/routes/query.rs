//! Document QA endpoint
//!
//! Authenticated: the retrieval call is always filtered to the requesting
//! user, so a valid ID token is required before anything else happens.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::pipeline::query::{self, ChatMessage};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
}

/// POST /query
pub async fn query_document(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let answer = query::respond(
        state.corpus.as_ref(),
        &auth.user_id,
        &req.query,
        req.doc_id.as_deref(),
        &req.chat_history,
    )
    .await?;

    Ok(Json(QueryResponse { answer }))
}
