//! Format-specific text extraction.
//!
//! Pure function of the blob bytes and resolved file type; no network or
//! filesystem access. The caller resolves the file type from the declared
//! MIME type before any blob is fetched.

use std::io::Read;

use crate::domain::FileType;
use crate::pipeline::error::PipelineError;

/// Maximum decompressed bytes read from a single ZIP entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extracts plain text. Whitespace-only output is an error: a document the
/// extractor cannot see is indistinguishable from an empty upload.
pub fn extract_text(bytes: &[u8], file_type: FileType) -> Result<String, PipelineError> {
    let text = match file_type {
        FileType::Pdf => extract_pdf(bytes)?,
        FileType::Docx => extract_docx(bytes)?,
        FileType::Txt => String::from_utf8_lossy(bytes).into_owned(),
    };

    if text.trim().is_empty() {
        return Err(PipelineError::EmptyDocument);
    }
    Ok(text)
}

fn extract_pdf(bytes: &[u8]) -> Result<String, PipelineError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PipelineError::Extraction(format!("PDF: {e}")))
}

/// Word-processing XML: one line of output per `w:p` paragraph, text taken
/// from the `w:t` runs inside it.
fn extract_docx(bytes: &[u8]) -> Result<String, PipelineError> {
    let xml = read_document_xml(bytes)?;

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        current.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"p" {
                    paragraphs.push(std::mem::take(&mut current));
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(PipelineError::Extraction(format!("DOCX: {e}"))),
            _ => {}
        }
        buf.clear();
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}

pub(crate) fn read_document_xml(bytes: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| PipelineError::Extraction(format!("DOCX: {e}")))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| PipelineError::Extraction("DOCX: word/document.xml not found".to_string()))?;
    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| PipelineError::Extraction(format!("DOCX: {e}")))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(PipelineError::Extraction(
            "DOCX: word/document.xml exceeds size limit".to_string(),
        ));
    }
    Ok(xml)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_passes_through() {
        let text = extract_text(b"Section 1. Parties.", FileType::Txt).unwrap();
        assert_eq!(text, "Section 1. Parties.");
    }

    #[test]
    fn whitespace_only_is_empty_document() {
        assert!(matches!(
            extract_text(b"  \n\t ", FileType::Txt),
            Err(PipelineError::EmptyDocument)
        ));
        assert!(matches!(extract_text(b"", FileType::Txt), Err(PipelineError::EmptyDocument)));
    }

    #[test]
    fn docx_paragraphs_are_newline_joined() {
        let bytes = fixtures::docx_with_paragraphs(&["First paragraph.", "Second paragraph."]);
        let text = extract_text(&bytes, FileType::Docx).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn invalid_pdf_is_an_extraction_error() {
        assert!(matches!(
            extract_text(b"not a pdf", FileType::Pdf),
            Err(PipelineError::Extraction(_))
        ));
    }

    #[test]
    fn invalid_zip_is_an_extraction_error() {
        assert!(matches!(
            extract_text(b"not a zip", FileType::Docx),
            Err(PipelineError::Extraction(_))
        ));
    }
}
