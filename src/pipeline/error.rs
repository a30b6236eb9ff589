//! Processing-pipeline error taxonomy.
//!
//! Every stage returns one of these; the orchestrator inspects the result,
//! writes the terminal status once, and surfaces the error unchanged. The
//! `Display` text is what lands in the record's `statusMessage`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    #[error("unsupported MIME type: {0}")]
    UnsupportedFormat(String),

    #[error("extracted text is empty")]
    EmptyDocument,

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("classifier returned an ambiguous verdict: {0:?}")]
    ClassificationAmbiguous(String),

    #[error("insight response is not valid JSON: {0}")]
    MalformedInsights(String),

    #[error("inference service error: {0}")]
    Inference(String),

    #[error("corpus ingestion failed: {0}")]
    IngestionFailure(String),

    #[error("object store error: {0}")]
    Storage(String),

    #[error("document store error: {0}")]
    Persistence(String),
}
