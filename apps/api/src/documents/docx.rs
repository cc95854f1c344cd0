use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::PipelineError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts paragraph text from a DOCX payload.
///
/// Paragraphs (`w:p`, including those inside tables) are joined with `\n` in
/// document order; empty paragraphs stay as empty lines.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, PipelineError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PipelineError::ParseFailure(format!("not a DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| PipelineError::ParseFailure(format!("{DOCUMENT_PART} unreadable: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| PipelineError::ParseFailure(format!("{DOCUMENT_PART} unreadable: {e}")))?;

    let paragraphs = collect_paragraphs(&xml)
        .map_err(|e| PipelineError::ParseFailure(format!("malformed {DOCUMENT_PART}: {e}")))?;
    Ok(paragraphs.join("\n"))
}

fn collect_paragraphs(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // Nesting depth of w:p; text boxes can nest paragraphs inside a paragraph.
    let mut depth = 0usize;
    let mut in_text_run = false;
    // w:pPr holds tab-stop definitions that are also named w:tab.
    let mut in_properties = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => depth += 1,
                b"w:t" => in_text_run = true,
                b"w:pPr" => in_properties = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if depth == 0 => paragraphs.push(String::new()),
                b"w:tab" if depth > 0 && !in_properties => current.push('\t'),
                b"w:br" | b"w:cr" if depth > 0 && !in_properties => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text_run && depth > 0 => {
                current.push_str(&e.unescape()?);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:pPr" => in_properties = false,
                b"w:p" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
