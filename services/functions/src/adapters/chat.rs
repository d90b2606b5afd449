//! services/functions/src/adapters/chat.rs
//!
//! The chat-completion call shared by the summary, flashcard and quiz
//! adapters.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use study_aid_core::ports::{PortError, PortResult};
use tracing::debug;

/// Sampling settings for one kind of request.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// An OpenAI chat model bound to a client.
#[derive(Clone)]
pub struct ChatModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl ChatModel {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Sends a system prompt, optionally followed by a user message, and
    /// returns the trimmed text of the first choice.
    pub async fn complete(
        &self,
        system: &str,
        user: Option<&str>,
        sampling: Sampling,
    ) -> PortResult<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into()];
        if let Some(user) = user {
            messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            );
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(sampling.temperature)
            .max_tokens(sampling.max_tokens)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PortError::Unexpected("LLM returned no choices in its response.".to_string()))?
            .message
            .content
            .ok_or_else(|| PortError::Unexpected("LLM response contained no text content.".to_string()))?;

        debug!(model = %self.model, chars = content.len(), "Chat completion received");
        Ok(content.trim().to_string())
    }
}

/// Removes a surrounding Markdown code fence (with or without a language tag)
/// from model output.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_content_is_only_trimmed() {
        assert_eq!(strip_code_fence("  [1, 2]\n"), "[1, 2]");
    }

    #[test]
    fn fenced_content_is_unwrapped() {
        assert_eq!(strip_code_fence("```json\n[{\"a\": 1}]\n```"), "[{\"a\": 1}]");
        assert_eq!(strip_code_fence("```\n[]\n```\n"), "[]");
    }

    #[test]
    fn unterminated_fence_keeps_the_body() {
        assert_eq!(strip_code_fence("```json\n[1]"), "[1]");
    }
}
