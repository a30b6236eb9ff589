//! Structured analysis generated for a legal document.
//!
//! The generative model is asked for JSON conforming to this shape. Every
//! field defaults when missing so a partially-conforming response still
//! parses; consumers must tolerate empty lists.

use serde::{Deserialize, Serialize};

/// Risk rating attached to key terms and insight categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    #[default]
    Low,
}

/// One occurrence of a key term on a rendered PDF page.
///
/// `page` is 1-based; `coords` is the `[x0, y0, x1, y1]` rectangle in PDF
/// text space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermLocation {
    pub page: u32,
    pub coords: [f32; 4],
}

/// A flagged contract/legal term with its risk rating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyTerm {
    pub term: String,
    pub risk: RiskLevel,
    /// Populated by the annotation pass for PDF documents, absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<TermLocation>>,
}

/// A named party or organization mentioned in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    pub name: String,
    pub role: String,
}

/// A categorized group of findings (e.g. "Financial Risk").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedInsight {
    pub category: String,
    pub level: RiskLevel,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractAnalysisSummary {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

/// The full analysis object attached to a COMPLETED document record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insights {
    pub summary: String,
    pub key_terms: Vec<KeyTerm>,
    pub entities: Vec<Entity>,
    pub detailed_insights: Vec<DetailedInsight>,
    pub contract_analysis_summary: ContractAnalysisSummary,
    pub suggested_questions: Vec<String>,
}
