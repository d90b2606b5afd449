//! services/functions/src/adapters/pdf.rs
//!
//! PDF text extraction with `pdf-extract`, implementing `TextExtractionService`.

use async_trait::async_trait;
use bytes::Bytes;
use study_aid_core::ports::{PortError, PortResult, TextExtractionService};

/// Extracts text page by page and joins the pages with newlines.
#[derive(Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    fn extract(pdf: &[u8]) -> PortResult<String> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf)
            .map_err(|e| PortError::Unexpected(format!("Failed to extract text from PDF: {e}")))?;
        Ok(pages.join("\n"))
    }
}

#[async_trait]
impl TextExtractionService for PdfTextExtractor {
    /// Parsing is CPU-bound and runs on the blocking pool. A panic inside the
    /// parser is reported as an ordinary extraction failure.
    async fn extract_text(&self, pdf: Bytes) -> PortResult<String> {
        tokio::task::spawn_blocking(move || Self::extract(&pdf))
            .await
            .map_err(|e| PortError::Unexpected(format!("PDF extraction task failed: {e}")))?
    }
}
