//! The document-processing pipeline.
//!
//! One invocation per uploaded file: fetch the blob, extract text, gate on
//! the legal-document classifier, register the file with the retrieval
//! corpus, generate insights, enrich per format, persist the terminal
//! record state. Every stage returns a `Result` that the orchestrator
//! inspects; exactly one status write happens per terminal outcome.

pub mod annotate;
pub mod classify;
pub mod error;
pub mod extract;
pub mod insights;
pub mod pdf_locate;
pub mod query;

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, instrument, warn};

use crate::domain::{DocumentPatch, FileType, UploadPath, UploadStatus};
use crate::services::{DocumentStore, ObjectStore, RetrievalCorpus, TextModel};
use self::error::PipelineError;

/// Status message persisted when the classifier rejects an upload.
const REJECTED_MESSAGE: &str = "The uploaded file does not appear to be a legal document.";

/// Terminal outcome of a successful pipeline invocation. Rejection is a
/// successful outcome: the pipeline did its job, the document just isn't
/// legal material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    Rejected,
}

impl PipelineOutcome {
    pub fn status(&self) -> UploadStatus {
        match self {
            Self::Completed => UploadStatus::Completed,
            Self::Rejected => UploadStatus::Rejected,
        }
    }
}

/// Advisory guard over documents currently being processed. Concurrent
/// invocations for distinct documents never contend; a second invocation
/// for the same `(userId, docId)` is refused while the first is in flight.
#[derive(Clone, Default)]
pub struct ActiveDocuments {
    inner: Arc<Mutex<HashSet<(String, String)>>>,
}

impl ActiveDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the document is already being processed. The returned
    /// guard releases the slot on drop, panics and early returns included.
    pub fn try_acquire(&self, user_id: &str, doc_id: &str) -> Option<ActiveGuard> {
        let key = (user_id.to_string(), doc_id.to_string());
        if self.inner.lock().insert(key.clone()) {
            Some(ActiveGuard { set: Arc::clone(&self.inner), key })
        } else {
            None
        }
    }
}

pub struct ActiveGuard {
    set: Arc<Mutex<HashSet<(String, String)>>>,
    key: (String, String),
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}

/// Orchestrates one document through every stage. Collaborators are
/// injected so tests can run the whole pipeline against fakes.
pub struct DocumentPipeline {
    objects: Arc<dyn ObjectStore>,
    store: Arc<dyn DocumentStore>,
    model: Arc<dyn TextModel>,
    corpus: Arc<dyn RetrievalCorpus>,
}

impl DocumentPipeline {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn TextModel>,
        corpus: Arc<dyn RetrievalCorpus>,
    ) -> Self {
        Self { objects, store, model, corpus }
    }

    /// Runs the pipeline for one upload. A malformed path fails before any
    /// record update (there is no record to update); any later failure is
    /// written to the record as FAILED and then surfaced unchanged.
    #[instrument(skip(self))]
    pub async fn run(
        &self,
        bucket: &str,
        file_path: &str,
        mime_type: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let target = UploadPath::parse(file_path)?;

        info!(
            user_id = %target.user_id,
            doc_id = %target.doc_id,
            mime_type = mime_type,
            "Processing upload"
        );

        match self.process(&target, bucket, file_path, mime_type).await {
            Ok(outcome) => {
                info!(doc_id = %target.doc_id, outcome = ?outcome, "Pipeline finished");
                Ok(outcome)
            }
            Err(err) => {
                warn!(doc_id = %target.doc_id, error = %err, "Pipeline failed");
                let patch = DocumentPatch::failed(err.to_string());
                if let Err(write_err) =
                    self.store.update_document(&target.user_id, &target.doc_id, &patch).await
                {
                    // The stage error stays the primary failure; a retried
                    // invocation re-runs the pipeline idempotently.
                    error!(doc_id = %target.doc_id, error = %write_err, "Could not record FAILED status");
                }
                Err(err)
            }
        }
    }

    async fn process(
        &self,
        target: &UploadPath,
        bucket: &str,
        file_path: &str,
        mime_type: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        // Resolved before the blob fetch: an unsupported format needs no
        // bytes to be refused.
        let file_type = FileType::from_mime(mime_type)?;

        let bytes = self.objects.fetch(bucket, file_path).await?;
        let text = extract::extract_text(&bytes, file_type)?;
        info!(doc_id = %target.doc_id, file_type = %file_type, chars = text.len(), "Text extracted");

        if !classify::classify_document(self.model.as_ref(), &text).await? {
            info!(doc_id = %target.doc_id, "Document rejected by classifier");
            self.store
                .update_document(&target.user_id, &target.doc_id, &DocumentPatch::rejected(REJECTED_MESSAGE))
                .await?;
            return Ok(PipelineOutcome::Rejected);
        }

        // The corpus upload wants a real file; the spool lives exactly as
        // long as this invocation and is removed on drop, error or not.
        let spool = spool_blob(&bytes)?;
        let handle = self
            .corpus
            .ingest_file(spool.path(), &target.file_name, &target.user_id, &target.doc_id)
            .await?;
        info!(doc_id = %target.doc_id, corpus_handle = %handle, "File ingested into corpus");

        let mut insights = insights::generate_insights(self.model.as_ref(), &text).await?;
        let html_content = annotate::annotate(file_type, &bytes, &mut insights)?;

        self.store
            .update_document(
                &target.user_id,
                &target.doc_id,
                &DocumentPatch::completed(file_type, text, insights, html_content),
            )
            .await?;

        Ok(PipelineOutcome::Completed)
    }
}

fn spool_blob(bytes: &[u8]) -> Result<tempfile::NamedTempFile, PipelineError> {
    let mut spool = tempfile::NamedTempFile::new()
        .map_err(|e| PipelineError::IngestionFailure(format!("spool file: {e}")))?;
    spool
        .write_all(bytes)
        .map_err(|e| PipelineError::IngestionFailure(format!("spool write: {e}")))?;
    Ok(spool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_guard_is_exclusive_per_document_and_released_on_drop() {
        let active = ActiveDocuments::new();

        let guard = active.try_acquire("user-1", "doc-9").unwrap();
        assert!(active.try_acquire("user-1", "doc-9").is_none());
        // A different document never contends.
        assert!(active.try_acquire("user-1", "doc-10").is_some());

        drop(guard);
        assert!(active.try_acquire("user-1", "doc-9").is_some());
    }

    #[test]
    fn spool_file_disappears_on_drop() {
        let spool = spool_blob(b"contract body").unwrap();
        let path = spool.path().to_path_buf();
        assert!(path.exists());
        drop(spool);
        assert!(!path.exists());
    }
}
