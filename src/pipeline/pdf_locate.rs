//! Positioned key-term search over PDF content streams.
//!
//! Walks each page's decoded content stream tracking the text cursor, turns
//! the shown strings into a positioned character sequence, and searches that
//! sequence for exact term matches. The starting pen position of a match is
//! exact; glyph advance is approximated from the font size, so the right
//! edge of a box is an estimate (no font width tables are consulted).

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Document, Object};

use crate::domain::TermLocation;
use crate::pipeline::error::PipelineError;

/// Horizontal advance per glyph as a fraction of the font size.
const GLYPH_ADVANCE_RATIO: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
struct PositionedChar {
    ch: char,
    x: f32,
    y: f32,
    size: f32,
}

/// Finds every occurrence of every term, page by page. Each requested term
/// gets an entry, empty when it never occurs. Pages are numbered from 1.
pub fn locate_terms(
    bytes: &[u8],
    terms: &[String],
) -> Result<HashMap<String, Vec<TermLocation>>, PipelineError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| PipelineError::Extraction(format!("PDF parse: {e}")))?;

    let mut found: HashMap<String, Vec<TermLocation>> =
        terms.iter().map(|t| (t.clone(), Vec::new())).collect();

    for (page_no, page_id) in doc.get_pages() {
        let data = doc
            .get_page_content(page_id)
            .map_err(|e| PipelineError::Extraction(format!("PDF page {page_no}: {e}")))?;
        let content = Content::decode(&data)
            .map_err(|e| PipelineError::Extraction(format!("PDF page {page_no}: {e}")))?;

        let chars = positioned_chars(&content);
        for (term, locations) in found.iter_mut() {
            collect_matches(&chars, term, page_no, locations);
        }
    }

    Ok(found)
}

fn num(object: Option<&Object>) -> f32 {
    match object {
        Some(Object::Integer(i)) => *i as f32,
        Some(Object::Real(r)) => *r as f32,
        _ => 0.0,
    }
}

/// Flattens the page's text-showing operators into positioned characters.
/// Explicit positioning operators insert a `\n` marker so matches never
/// span separately-placed runs; kerning adjustments inside `TJ` only move
/// the pen.
fn positioned_chars(content: &Content) -> Vec<PositionedChar> {
    let mut chars: Vec<PositionedChar> = Vec::new();
    let (mut x, mut y) = (0.0f32, 0.0f32);
    let (mut line_x, mut line_y) = (0.0f32, 0.0f32);
    let mut size = 0.0f32;
    let mut leading = 0.0f32;

    fn break_run(chars: &mut Vec<PositionedChar>, x: f32, y: f32, size: f32) {
        if chars.last().map_or(false, |c| c.ch != '\n') {
            chars.push(PositionedChar { ch: '\n', x, y, size });
        }
    }

    fn show(chars: &mut Vec<PositionedChar>, text: &[u8], x: &mut f32, y: f32, size: f32) {
        for &b in text {
            chars.push(PositionedChar { ch: b as char, x: *x, y, size });
            *x += size * GLYPH_ADVANCE_RATIO;
        }
    }

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                x = 0.0;
                y = 0.0;
                line_x = 0.0;
                line_y = 0.0;
            }
            "Tf" => size = num(op.operands.get(1)),
            "TL" => leading = num(op.operands.first()),
            "Td" | "TD" => {
                let ty = num(op.operands.get(1));
                if op.operator == "TD" {
                    leading = -ty;
                }
                line_x += num(op.operands.first());
                line_y += ty;
                x = line_x;
                y = line_y;
                break_run(&mut chars, x, y, size);
            }
            "Tm" => {
                line_x = num(op.operands.get(4));
                line_y = num(op.operands.get(5));
                x = line_x;
                y = line_y;
                break_run(&mut chars, x, y, size);
            }
            "T*" => {
                line_y -= leading;
                x = line_x;
                y = line_y;
                break_run(&mut chars, x, y, size);
            }
            "Tj" => {
                if let Some(Object::String(text, _)) = op.operands.first() {
                    show(&mut chars, text, &mut x, y, size);
                }
            }
            "'" | "\"" => {
                line_y -= leading;
                x = line_x;
                y = line_y;
                break_run(&mut chars, x, y, size);
                let operand = if op.operator == "'" { 0 } else { 2 };
                if let Some(Object::String(text, _)) = op.operands.get(operand) {
                    show(&mut chars, text, &mut x, y, size);
                }
            }
            "TJ" => {
                if let Some(Object::Array(elements)) = op.operands.first() {
                    for element in elements {
                        match element {
                            Object::String(text, _) => show(&mut chars, text, &mut x, y, size),
                            Object::Integer(_) | Object::Real(_) => {
                                x -= num(Some(element)) / 1000.0 * size;
                            }
                            _ => {}
                        }
                    }
                }
            }
            "ET" => break_run(&mut chars, x, y, size),
            _ => {}
        }
    }

    chars
}

fn collect_matches(
    chars: &[PositionedChar],
    term: &str,
    page: u32,
    locations: &mut Vec<TermLocation>,
) {
    let needle: Vec<char> = term.chars().collect();
    if needle.is_empty() || chars.len() < needle.len() {
        return;
    }

    for start in 0..=chars.len() - needle.len() {
        let window = &chars[start..start + needle.len()];
        if window.iter().zip(&needle).all(|(c, n)| c.ch == *n) {
            let last = window[window.len() - 1];
            let x0 = window[0].x;
            let x1 = last.x + last.size * GLYPH_ADVANCE_RATIO;
            let y0 = window.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
            let y1 = window.iter().map(|c| c.y + c.size).fold(f32::NEG_INFINITY, f32::max);
            locations.push(TermLocation { page, coords: [x0, y0, x1, y1] });
        }
    }
}
