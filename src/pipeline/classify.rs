//! Legal-document gate.
//!
//! One constrained generation call over a bounded prefix of the text. The
//! model is instructed to answer with a single token; anything that is not
//! a recognizable YES/NO after trimming is a defined error rather than a
//! silent rejection.

use crate::pipeline::error::PipelineError;
use crate::services::TextModel;

/// Characters of extracted text shown to the classifier. The verdict does
/// not improve past the first few pages, and inference is billed by token.
const CLASSIFY_PREFIX_CHARS: usize = 3000;

pub async fn classify_document(model: &dyn TextModel, text: &str) -> Result<bool, PipelineError> {
    let prefix: String = text.chars().take(CLASSIFY_PREFIX_CHARS).collect();
    let prompt = format!(
        "Decide whether the following text is from a legal document (a contract, \
         agreement, statute, filing, policy, or similar instrument). Respond with \
         exactly one word: YES or NO. Do not add any other text.\n\n\
         Text:\n---\n{prefix}\n---"
    );

    let raw = model.generate(&prompt).await?;
    parse_verdict(&raw)
}

fn parse_verdict(raw: &str) -> Result<bool, PipelineError> {
    let verdict = raw.trim().trim_end_matches(['.', '!']).trim().to_uppercase();
    match verdict.as_str() {
        "YES" => Ok(true),
        "NO" => Ok(false),
        _ => Err(PipelineError::ClassificationAmbiguous(
            raw.trim().chars().take(80).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct ScriptedModel {
        reply: &'static str,
        last_prompt: Mutex<String>,
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
            *self.last_prompt.lock() = prompt.to_string();
            Ok(self.reply.to_string())
        }
    }

    #[test]
    fn verdict_parses_exact_and_sloppy_answers() {
        assert!(parse_verdict("YES").unwrap());
        assert!(parse_verdict(" yes.\n").unwrap());
        assert!(!parse_verdict("No").unwrap());
        assert!(!parse_verdict("NO!").unwrap());
    }

    #[test]
    fn anything_else_is_ambiguous() {
        assert!(matches!(
            parse_verdict("It appears to be a contract."),
            Err(PipelineError::ClassificationAmbiguous(_))
        ));
        assert!(matches!(parse_verdict(""), Err(PipelineError::ClassificationAmbiguous(_))));
    }

    #[tokio::test]
    async fn only_a_bounded_prefix_is_sent() {
        let model = ScriptedModel { reply: "YES", last_prompt: Mutex::new(String::new()) };
        let text = "x".repeat(10_000);

        assert!(classify_document(&model, &text).await.unwrap());

        let prompt = model.last_prompt.lock().clone();
        assert!(prompt.len() < 4_000, "prompt unexpectedly long: {} chars", prompt.len());
    }
}
