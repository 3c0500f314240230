//! Text extraction from uploaded resume files.
//!
//! Supports PDF (via `pdf-extract`) and DOCX (zip container + WordprocessingML).
//! Extraction is per-request and side-effect free: the uploaded bytes never
//! touch disk.

use std::path::Path;

use thiserror::Error;

mod docx;
mod pdf;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Could not extract text from {kind} file: {message}")]
    Malformed {
        kind: &'static str,
        message: String,
    },
}

/// Accepted upload formats, derived from the file extension (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
}

impl FileKind {
    pub fn from_file_name(name: &str) -> Result<Self, ExtractError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Ok(FileKind::Pdf),
            Some("docx") => Ok(FileKind::Docx),
            _ => Err(ExtractError::UnsupportedFileType(name.to_string())),
        }
    }
}

/// Returns the plain-text layer of the uploaded document.
pub fn extract_text(kind: FileKind, bytes: &[u8]) -> Result<String, ExtractError> {
    match kind {
        FileKind::Pdf => pdf::extract(bytes),
        FileKind::Docx => docx::extract(bytes),
    }
}
