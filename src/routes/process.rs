//! Upload-processing trigger
//!
//! HTTP variant of the storage-event trigger: the forwarder posts the
//! bucket, object path, and declared content type of a finished upload and
//! gets back the terminal status.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::{UploadPath, UploadStatus};
use crate::error::ApiError;
use crate::pipeline::DocumentPipeline;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub bucket: String,
    pub file_path: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: UploadStatus,
}

/// POST /process
pub async fn process_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    // Parsed here as well as in the pipeline: the advisory guard needs the
    // document key, and a malformed path must be a 400 with no record touched.
    let target = UploadPath::parse(&req.file_path).map_err(ApiError::from)?;

    let _guard = state.active.try_acquire(&target.user_id, &target.doc_id).ok_or_else(|| {
        ApiError::Conflict(format!("document {} is already being processed", target.doc_id))
    })?;

    let pipeline = DocumentPipeline::new(
        state.objects.clone(),
        state.store.clone(),
        state.model.clone(),
        state.corpus.clone(),
    );

    let outcome = pipeline.run(&req.bucket, &req.file_path, &req.mime_type).await?;

    Ok(Json(ProcessResponse { status: outcome.status() }))
}
