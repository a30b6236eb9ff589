//! Domain types for document records and generated insights.

pub mod documents;
pub mod insights;

pub use documents::{DocumentPatch, FileType, UploadPath, UploadStatus};
pub use insights::{
    ContractAnalysisSummary, DetailedInsight, Entity, Insights, KeyTerm, RiskLevel, TermLocation,
};
