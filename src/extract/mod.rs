//! Text extraction boundary.
//!
//! Converts raw document bytes into plain text plus a page map. PDF, DOCX
//! and image OCR live behind the [`TextExtractor`] trait so an OCR-capable
//! implementation can be plugged in; the built-in [`PlainTextExtractor`]
//! covers plain text, CSV and Drive-exported Google Workspace documents.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::core::errors::ApiError;

/// One page of extracted text. Positions are character offsets into the
/// full document text.
#[derive(Debug, Clone)]
pub struct PageSpan {
    pub page_number: u32,
    pub text: String,
    pub start_position: usize,
    pub end_position: usize,
}

#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
    pub pages: Vec<PageSpan>,
}

/// Abstract extractor for one document.
///
/// Implementations must return empty `text` (not an error) when the input is
/// readable but carries no recoverable text; `ApiError::Extraction` is
/// reserved for unreadable or unsupported input.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(
        &self,
        bytes: &[u8],
        mime_type: &str,
        filename: &str,
    ) -> Result<ExtractedText, ApiError>;
}

const TEXT_MIME_TYPES: [&str; 2] = ["text/plain", "text/csv"];

/// Page-break heuristic: form feed, a run of three or more blank-ish lines,
/// or an explicit "Page N" marker line.
static PAGE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\f|\n\s*\n\s*\n|\n\s*Page\s+\d+\s*\n").expect("valid page-break pattern")
});

/// Extractor for text-based MIME types.
///
/// Google Workspace documents arrive here already exported to plain text by
/// the Drive client, so they are accepted alongside `text/*`.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(
        &self,
        bytes: &[u8],
        mime_type: &str,
        filename: &str,
    ) -> Result<ExtractedText, ApiError> {
        let supported = TEXT_MIME_TYPES.contains(&mime_type)
            || mime_type.starts_with("application/vnd.google-apps");
        if !supported {
            return Err(ApiError::Extraction(format!(
                "unsupported MIME type {mime_type} for {filename}"
            )));
        }

        let text = String::from_utf8_lossy(bytes).into_owned();
        Ok(split_into_pages(text))
    }
}

/// Split extracted text into page spans using the page-break heuristic.
/// A document with no recognizable breaks is a single page.
pub fn split_into_pages(text: String) -> ExtractedText {
    let pieces: Vec<&str> = PAGE_BREAK_RE.split(&text).collect();

    let mut pages = Vec::new();
    let mut current_position = 0usize;
    for piece in &pieces {
        if piece.trim().is_empty() {
            continue;
        }
        let len = piece.chars().count();
        pages.push(PageSpan {
            page_number: pages.len() as u32 + 1,
            text: piece.trim().to_string(),
            start_position: current_position,
            end_position: current_position + len,
        });
        current_position += len;
    }

    if pages.is_empty() {
        let len = text.chars().count();
        pages.push(PageSpan {
            page_number: 1,
            text: text.clone(),
            start_position: 0,
            end_position: len,
        });
    }

    ExtractedText {
        page_count: pages.len(),
        pages,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_single_page() {
        let extracted = PlainTextExtractor
            .extract(b"hello world", "text/plain", "notes.txt")
            .await
            .unwrap();
        assert_eq!(extracted.text, "hello world");
        assert_eq!(extracted.page_count, 1);
        assert_eq!(extracted.pages[0].page_number, 1);
    }

    #[tokio::test]
    async fn form_feed_splits_pages() {
        let extracted = PlainTextExtractor
            .extract(b"first page\x0csecond page", "text/plain", "doc.txt")
            .await
            .unwrap();
        assert_eq!(extracted.page_count, 2);
        assert_eq!(extracted.pages[0].text, "first page");
        assert_eq!(extracted.pages[1].text, "second page");
        assert!(extracted.pages[1].start_position >= extracted.pages[0].end_position);
    }

    #[tokio::test]
    async fn empty_input_is_a_value_not_an_error() {
        let extracted = PlainTextExtractor
            .extract(b"", "text/plain", "empty.txt")
            .await
            .unwrap();
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.page_count, 1);
    }

    #[tokio::test]
    async fn unsupported_mime_is_an_extraction_error() {
        let err = PlainTextExtractor
            .extract(b"\x89PNG", "image/png", "scan.png")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Extraction(_)));
    }

    #[tokio::test]
    async fn google_workspace_exports_are_accepted() {
        let extracted = PlainTextExtractor
            .extract(
                b"exported body",
                "application/vnd.google-apps.document",
                "report",
            )
            .await
            .unwrap();
        assert_eq!(extracted.text, "exported body");
    }
}
