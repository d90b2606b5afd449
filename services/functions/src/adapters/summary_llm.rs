//! services/functions/src/adapters/summary_llm.rs
//!
//! Implements the `SummarizationService` port with an OpenAI chat model.

use async_trait::async_trait;
use study_aid_core::ports::{PortError, PortResult, SummarizationService};

use super::chat::{ChatModel, Sampling};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarises study material.";

const SAMPLING: Sampling = Sampling {
    temperature: 0.5,
    max_tokens: 300,
};

/// An adapter that implements `SummarizationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    model: ChatModel,
}

impl OpenAiSummaryAdapter {
    pub fn new(model: ChatModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl SummarizationService for OpenAiSummaryAdapter {
    async fn summarize(&self, text: &str) -> PortResult<String> {
        let summary = self.model.complete(SYSTEM_PROMPT, Some(text), SAMPLING).await?;
        if summary.is_empty() {
            return Err(PortError::Unexpected(
                "Summary LLM returned an empty summary.".to_string(),
            ));
        }
        Ok(summary)
    }
}
