//! Service layer for the external collaborators.
//!
//! Each collaborator is a trait (so the pipeline and routes take injected
//! implementations) plus one HTTP client implementation.

pub mod corpus;
pub mod docstore;
pub mod gemini;
pub mod storage;

pub use corpus::{RagCorpusClient, RetrievalCorpus};
pub use docstore::{DocumentStore, RestDocumentStore};
pub use gemini::{GeminiClient, TextModel};
pub use storage::{GcsObjectStore, ObjectStore};
