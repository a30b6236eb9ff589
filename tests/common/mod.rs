//! In-memory fakes of the four external collaborators, plus file fixtures.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use lexlens_backend::domain::DocumentPatch;
use lexlens_backend::pipeline::error::PipelineError;
use lexlens_backend::services::{DocumentStore, ObjectStore, RetrievalCorpus, TextModel};

/// Serves blobs from a map keyed by `(bucket, object)` and counts fetches.
#[derive(Default)]
pub struct FakeObjectStore {
    blobs: HashMap<(String, String), Vec<u8>>,
    pub fetches: Mutex<u32>,
}

impl FakeObjectStore {
    pub fn with_blob(bucket: &str, object: &str, bytes: &[u8]) -> Self {
        let mut blobs = HashMap::new();
        blobs.insert((bucket.to_string(), object.to_string()), bytes.to_vec());
        Self { blobs, fetches: Mutex::new(0) }
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn fetch(&self, bucket: &str, object: &str) -> Result<Vec<u8>, PipelineError> {
        *self.fetches.lock() += 1;
        self.blobs
            .get(&(bucket.to_string(), object.to_string()))
            .cloned()
            .ok_or_else(|| PipelineError::Storage(format!("no such object: {bucket}/{object}")))
    }
}

/// Records every patch it is asked to apply.
#[derive(Default)]
pub struct RecordingStore {
    pub patches: Mutex<Vec<(String, String, DocumentPatch)>>,
}

impl RecordingStore {
    pub fn patch_count(&self) -> usize {
        self.patches.lock().len()
    }

    pub fn last_patch(&self) -> DocumentPatch {
        self.patches.lock().last().expect("no patch recorded").2.clone()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn update_document(
        &self,
        user_id: &str,
        doc_id: &str,
        patch: &DocumentPatch,
    ) -> Result<(), PipelineError> {
        self.patches.lock().push((user_id.to_string(), doc_id.to_string(), patch.clone()));
        Ok(())
    }
}

/// Replies to `generate` calls from a script, in order.
pub enum Reply {
    Text(&'static str),
    Fail(&'static str),
}

#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    pub calls: Mutex<u32>,
}

impl ScriptedModel {
    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self { replies: Mutex::new(replies.into()), calls: Mutex::new(0) }
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, PipelineError> {
        *self.calls.lock() += 1;
        match self.replies.lock().pop_front().expect("scripted model ran out of replies") {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Fail(message) => Err(PipelineError::Inference(message.to_string())),
        }
    }
}

/// Records ingests; answers queries from a fixed value.
#[derive(Default)]
pub struct RecordingCorpus {
    pub ingested: Mutex<Vec<String>>,
    pub answer: Option<String>,
}

impl RecordingCorpus {
    pub fn answering(answer: Option<&str>) -> Self {
        Self { ingested: Mutex::new(Vec::new()), answer: answer.map(str::to_string) }
    }
}

#[async_trait]
impl RetrievalCorpus for RecordingCorpus {
    async fn ingest_file(
        &self,
        path: &Path,
        display_name: &str,
        _user_id: &str,
        _doc_id: &str,
    ) -> Result<String, PipelineError> {
        assert!(path.exists(), "spool file must exist during ingest");
        self.ingested.lock().push(display_name.to_string());
        Ok(format!("files/{display_name}"))
    }

    async fn answer(
        &self,
        _query: &str,
        _user_id: &str,
        _doc_id: Option<&str>,
    ) -> Result<Option<String>, PipelineError> {
        Ok(self.answer.clone())
    }
}

/// A well-formed insight reply the scripted model can hand back.
pub const INSIGHTS_JSON: &str = r#"{
    "summary": "A services agreement with a broad indemnity.",
    "keyTerms": [ { "term": "Indemnification", "risk": "High" } ],
    "entities": [ { "name": "Acme Corp", "role": "Contract Party" } ],
    "detailedInsights": [
        { "category": "Financial Risk", "level": "High", "items": ["Uncapped liability."] }
    ],
    "contractAnalysisSummary": { "strengths": ["Clear term."], "concerns": ["One-sided indemnity."] },
    "suggestedQuestions": ["Is the indemnity mutual?"]
}"#;

/// Minimal docx archive with one `w:p` per paragraph.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{body}</w:body></w:document>"
    );
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default()).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
