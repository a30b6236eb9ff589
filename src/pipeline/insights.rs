//! Structured insight generation.
//!
//! One generation call over the full text with a prompt that mandates the
//! `Insights` JSON schema, followed by a typed parse. Models routinely wrap
//! JSON in markdown fences despite instructions, so fences are stripped
//! before parsing.

use crate::domain::Insights;
use crate::pipeline::error::PipelineError;
use crate::services::TextModel;

pub async fn generate_insights(model: &dyn TextModel, text: &str) -> Result<Insights, PipelineError> {
    let raw = model.generate(&insight_prompt(text)).await?;
    parse_insights(&raw)
}

fn insight_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following legal document text and generate a structured JSON object containing a detailed analysis. The JSON object must conform to the following schema:

{{
  "summary": "A concise, 2-3 sentence overall summary of the document's purpose.",
  "keyTerms": [
    {{ "term": "Term Name 1", "risk": "High|Medium|Low" }},
    {{ "term": "Term Name 2", "risk": "High|Medium|Low" }}
  ],
  "entities": [
    {{ "name": "Entity Name", "role": "Role (e.g., Contract Party, Organization)" }}
  ],
  "detailedInsights": [
    {{
      "category": "Financial Risk",
      "level": "High|Medium|Low",
      "items": ["Point 1 about financial risk.", "Point 2 about financial risk."]
    }},
    {{
      "category": "Legal Compliance",
      "level": "High|Medium|Low",
      "items": ["Point 1 about legal compliance.", "Point 2 about legal compliance."]
    }},
    {{
      "category": "Timeline Risk",
      "level": "High|Medium|Low",
      "items": ["Point 1 about timelines.", "Point 2 about timelines."]
    }}
  ],
  "contractAnalysisSummary": {{
    "strengths": ["List of strengths."],
    "concerns": ["List of concerns."]
  }},
  "suggestedQuestions": [
    "A relevant question about the document.",
    "Another relevant question."
  ]
}}

Document Text:
---
{text}
---

Provide only the JSON object as a response, without any additional text or markdown formatting."#
    )
}

fn parse_insights(raw: &str) -> Result<Insights, PipelineError> {
    let cleaned = raw.trim().replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim()).map_err(|e| PipelineError::MalformedInsights(e.to_string()))
}
