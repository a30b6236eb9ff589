//! Format-specific enrichment after insight generation.
//!
//! PDFs get per-term page locations for viewer highlighting; DOCX and TXT
//! uploads get an HTML preview since the browser cannot render them
//! natively.

use crate::domain::{FileType, Insights};
use crate::pipeline::error::PipelineError;
use crate::pipeline::{extract, pdf_locate};

/// Enriches `insights` in place and returns the HTML preview when the
/// format needs one. Every key term of a PDF ends up with a location list,
/// empty included, so the viewer can distinguish "not found" from
/// "not searched".
pub fn annotate(
    file_type: FileType,
    bytes: &[u8],
    insights: &mut Insights,
) -> Result<Option<String>, PipelineError> {
    match file_type {
        FileType::Pdf => {
            let terms: Vec<String> =
                insights.key_terms.iter().map(|t| t.term.clone()).collect();
            let mut located = pdf_locate::locate_terms(bytes, &terms)?;
            for term in &mut insights.key_terms {
                term.locations = Some(located.remove(&term.term).unwrap_or_default());
            }
            Ok(None)
        }
        FileType::Docx => Ok(Some(render_docx_html(bytes)?)),
        FileType::Txt => {
            let raw = String::from_utf8_lossy(bytes);
            Ok(Some(format!("<pre>{}</pre>", escape_html(&raw))))
        }
    }
}

/// Renders `word/document.xml` as paragraphs with bold/italic runs.
fn render_docx_html(bytes: &[u8]) -> Result<String, PipelineError> {
    use quick_xml::events::Event;

    let xml = extract::read_document_xml(bytes)?;

    let mut out = String::new();
    let mut paragraph = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut in_run_props = false;
    let mut bold = false;
    let mut italic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"r" => {
                    bold = false;
                    italic = false;
                }
                b"rPr" => in_run_props = true,
                b"b" if in_run_props => bold = true,
                b"i" if in_run_props => italic = true,
                b"t" => {
                    if let Ok(Event::Text(te)) = reader.read_event_into(&mut buf) {
                        let text = escape_html(te.unescape().unwrap_or_default().as_ref());
                        match (bold, italic) {
                            (true, true) => {
                                paragraph.push_str(&format!("<strong><em>{text}</em></strong>"))
                            }
                            (true, false) => paragraph.push_str(&format!("<strong>{text}</strong>")),
                            (false, true) => paragraph.push_str(&format!("<em>{text}</em>")),
                            (false, false) => paragraph.push_str(&text),
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"b" if in_run_props => bold = true,
                b"i" if in_run_props => italic = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"rPr" => in_run_props = false,
                b"p" => {
                    out.push_str("<p>");
                    out.push_str(&paragraph);
                    out.push_str("</p>\n");
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PipelineError::Extraction(format!("DOCX: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
