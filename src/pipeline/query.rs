//! Query responder: one retrieval-augmented answer per question.

use serde::{Deserialize, Serialize};

use crate::pipeline::error::PipelineError;
use crate::services::RetrievalCorpus;

/// Returned verbatim when retrieval yields no usable answer text, so the
/// client always has something to display.
pub const NO_ANSWER_FALLBACK: &str =
    "I couldn't find anything in the document that answers that question.";

/// One turn of the client-side conversation. Accepted with the request but
/// not yet forwarded to the retrieval call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Answers a question scoped to the requesting user and, when given, one
/// document. Never returns an empty answer.
pub async fn respond(
    corpus: &dyn RetrievalCorpus,
    user_id: &str,
    query: &str,
    doc_id: Option<&str>,
    _chat_history: &[ChatMessage],
) -> Result<String, PipelineError> {
    let answer = corpus.answer(query, user_id, doc_id).await?;
    Ok(answer.unwrap_or_else(|| NO_ANSWER_FALLBACK.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    struct FixedCorpus(Option<String>);

    #[async_trait]
    impl RetrievalCorpus for FixedCorpus {
        async fn ingest_file(
            &self,
            _path: &Path,
            _display_name: &str,
            _user_id: &str,
            _doc_id: &str,
        ) -> Result<String, PipelineError> {
            unreachable!("query tests never ingest")
        }

        async fn answer(
            &self,
            _query: &str,
            _user_id: &str,
            _doc_id: Option<&str>,
        ) -> Result<Option<String>, PipelineError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn answer_text_passes_through() {
        let corpus = FixedCorpus(Some("Thirty days.".into()));
        let answer = respond(&corpus, "user-1", "notice period?", Some("doc-9"), &[])
            .await
            .unwrap();
        assert_eq!(answer, "Thirty days.");
    }

    #[tokio::test]
    async fn empty_retrieval_yields_the_fallback() {
        let corpus = FixedCorpus(None);
        let answer = respond(&corpus, "user-1", "notice period?", None, &[]).await.unwrap();
        assert_eq!(answer, NO_ANSWER_FALLBACK);
        assert!(!answer.is_empty());
    }
}
