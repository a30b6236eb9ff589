//! Document record types
//!
//! A document record lives at `users/{userId}/documents/{docId}` in the
//! document store. The record is created by the uploader with status
//! PENDING; the processing pipeline is the only writer afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::insights::Insights;
use crate::pipeline::error::PipelineError;

/// Terminal and in-flight processing states of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Pending,
    Completed,
    Rejected,
    Failed,
}

/// Supported upload formats, resolved from the declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
    Txt,
}

impl FileType {
    /// Substring dispatch over the declared MIME type. The word-processing
    /// match is deliberately narrow so legacy `.doc` uploads fail here
    /// instead of producing garbage downstream.
    pub fn from_mime(mime: &str) -> Result<Self, PipelineError> {
        if mime.contains("pdf") {
            Ok(Self::Pdf)
        } else if mime.contains("openxmlformats-officedocument.wordprocessingml") {
            Ok(Self::Docx)
        } else if mime.contains("text") {
            Ok(Self::Txt)
        } else {
            Err(PipelineError::UnsupportedFormat(mime.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decomposed object-store path of an upload: `userId/docId/filename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPath {
    pub user_id: String,
    pub doc_id: String,
    pub file_name: String,
}

impl UploadPath {
    pub fn parse(path: &str) -> Result<Self, PipelineError> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(PipelineError::InvalidPath(path.to_string()));
        }
        Ok(Self {
            user_id: parts[0].to_string(),
            doc_id: parts[1].to_string(),
            // Nested prefixes are allowed; the last segment is the file.
            file_name: parts[parts.len() - 1].to_string(),
        })
    }
}

/// Merge-patch applied to a document record. Absent fields are left
/// untouched by the store, so each constructor writes exactly the fields
/// its terminal state is allowed to carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    pub upload_status: Option<UploadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl DocumentPatch {
    pub fn completed(
        file_type: FileType,
        file_content: String,
        insights: Insights,
        html_content: Option<String>,
    ) -> Self {
        Self {
            upload_status: Some(UploadStatus::Completed),
            status_message: None,
            file_type: Some(file_type),
            file_content: Some(file_content),
            html_content,
            insights: Some(insights),
            processed_at: Some(Utc::now()),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            upload_status: Some(UploadStatus::Rejected),
            status_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            upload_status: Some(UploadStatus::Failed),
            status_message: Some(message.into()),
            ..Self::default()
        }
    }
}
