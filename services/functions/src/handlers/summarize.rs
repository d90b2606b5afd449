//! services/functions/src/handlers/summarize.rs
//!
//! Summarizes study material sent either as raw `text` or as a base64 PDF in
//! `fileContent`. Without a language model, or when the call fails, the
//! summary is the truncated input.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use study_aid_core::domain::fallback_summary;
use study_aid_core::ports::{SummarizationService, TextExtractionService};
use tracing::warn;

use super::envelope::{decode_base64, ApiResponse, GatewayEvent, Payload};
use super::Handler;
use crate::error::HandlerError;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

pub struct SummarizeHandler {
    summarizer: Option<Arc<dyn SummarizationService>>,
    extractor: Arc<dyn TextExtractionService>,
}

impl SummarizeHandler {
    pub fn new(
        summarizer: Option<Arc<dyn SummarizationService>>,
        extractor: Arc<dyn TextExtractionService>,
    ) -> Self {
        Self {
            summarizer,
            extractor,
        }
    }

    async fn pdf_text(&self, encoded: &str) -> Result<String, String> {
        let pdf = decode_base64(encoded).map_err(|e| e.to_string())?;
        self.extractor
            .extract_text(pdf.into())
            .await
            .map_err(|e| e.to_string())
    }

    async fn summarize(&self, text: &str) -> String {
        let Some(summarizer) = &self.summarizer else {
            return fallback_summary(text);
        };

        match summarizer.summarize(text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Summarization failed, falling back to truncation");
                fallback_summary(text)
            }
        }
    }
}

#[async_trait]
impl Handler for SummarizeHandler {
    type Event = GatewayEvent;

    async fn handle(&self, event: GatewayEvent) -> Result<ApiResponse, HandlerError> {
        let payload = match Payload::from_event(&event) {
            Ok(payload) => payload,
            Err(e) => return Ok(ApiResponse::bad_request(format!("Invalid JSON: {e}"))),
        };

        let text = if let Some(text) = payload.non_empty_str("text") {
            text.to_string()
        } else if let Some(encoded) = payload.non_empty_str("fileContent") {
            match self.pdf_text(encoded).await {
                Ok(text) => text,
                Err(reason) => {
                    return Ok(ApiResponse::bad_request(format!("Failed to decode PDF: {reason}")))
                }
            }
        } else {
            return Ok(ApiResponse::bad_request(
                "Missing 'text' or 'fileContent' in request",
            ));
        };

        if text.is_empty() {
            return Ok(ApiResponse::bad_request("No content provided to summarise"));
        }

        let summary = self.summarize(&text).await;
        ApiResponse::ok(&SummaryResponse { summary })
    }
}
