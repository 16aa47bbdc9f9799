//! Document text: turns an uploaded résumé into plain text for the extractor.
//!
//! PDF parsing is CPU-bound and runs on the blocking pool.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Maximum characters of document text echoed back for preview.
pub const PREVIEW_CHARS: usize = 1000;

/// Pluggable text extraction. Carried in `AppState` as `Arc<dyn TextExtractor>`.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the document's text. An unreadable document yields an empty string,
    /// which callers turn into `AppError::EmptyInput` via `ensure_text`.
    async fn extract_text(&self, bytes: Bytes, content_type: &str) -> Result<String, AppError>;
}

/// Default extractor: PDF via `pdf-extract`, UTF-8 text as-is.
pub struct DocumentTextExtractor;

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract_text(&self, bytes: Bytes, content_type: &str) -> Result<String, AppError> {
        match DocumentKind::from_content_type(content_type)? {
            DocumentKind::Pdf => {
                let size = bytes.len();
                let result = tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text_from_mem(&bytes)
                })
                .await;

                match result {
                    Ok(Ok(text)) => {
                        debug!(bytes = size, chars = text.len(), "Extracted PDF text");
                        Ok(text)
                    }
                    Ok(Err(e)) => {
                        warn!("PDF text extraction failed ({size} bytes): {e}");
                        Ok(String::new())
                    }
                    // pdf-extract panics on some malformed files
                    Err(e) if e.is_panic() => {
                        warn!("PDF parser panicked ({size} bytes)");
                        Ok(String::new())
                    }
                    Err(e) => Err(AppError::Internal(e.into())),
                }
            }
            DocumentKind::PlainText => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    fn from_content_type(content_type: &str) -> Result<Self, AppError> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "application/pdf" => Ok(DocumentKind::Pdf),
            "text/plain" | "text/markdown" => Ok(DocumentKind::PlainText),
            _ => Err(AppError::Validation(
                "File must be a PDF or plain text".to_string(),
            )),
        }
    }
}

/// Rejects blank text before it reaches the keyword extractor.
pub fn ensure_text(text: &str) -> Result<&str, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyInput);
    }
    Ok(trimmed)
}

/// First `PREVIEW_CHARS` characters followed by `...`.
pub fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}
