//! Turns an uploaded PDF or DOCX into plain text.

use std::path::Path;

use tracing::debug;

use crate::errors::PipelineError;

pub mod docx;
pub mod pdf;

/// The document formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolves the kind from the uploaded file name's extension.
    pub fn from_filename(filename: &str) -> Result<Self, PipelineError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("docx") => Ok(DocumentKind::Docx),
            _ => Err(PipelineError::UnsupportedFormat(filename.to_string())),
        }
    }
}

/// Extracts the text content of a document. Fails loudly on anything unreadable,
/// including documents that decode to nothing but whitespace.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, PipelineError> {
    let text = match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(bytes)?,
        DocumentKind::Docx => docx::extract_docx_text(bytes)?,
    };

    if text.trim().is_empty() {
        return Err(PipelineError::ParseFailure(
            "document contains no extractable text".to_string(),
        ));
    }
    Ok(text)
}

/// A file received in a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: bytes::Bytes,
}

/// Resolves the kind from `filename` and decodes `bytes` on the blocking pool.
pub async fn extract_upload(filename: &str, bytes: bytes::Bytes) -> Result<String, PipelineError> {
    let kind = DocumentKind::from_filename(filename)?;

    let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
        .await
        .map_err(|e| PipelineError::ParseFailure(format!("document decoder aborted: {e}")))??;

    debug!("Extracted {} chars from {filename} ({kind:?})", text.len());
    Ok(text)
}
