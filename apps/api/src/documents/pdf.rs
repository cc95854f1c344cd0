use crate::errors::PipelineError;

/// Extracts the text of every page in document order.
///
/// Each page is followed by a newline and only the final string is trimmed, so
/// blank lines between pages survive.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, PipelineError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| PipelineError::ParseFailure(format!("unreadable PDF: {e}")))?;

    let mut text = String::new();
    for page in &pages {
        text.push_str(page);
        text.push('\n');
    }
    Ok(text.trim().to_string())
}
