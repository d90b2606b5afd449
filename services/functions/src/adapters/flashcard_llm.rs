//! services/functions/src/adapters/flashcard_llm.rs
//!
//! Implements the `FlashcardGenerationService` port with an OpenAI chat model.
//! The model is asked for a JSON list of cards; anything that does not parse
//! as one is an error and the caller falls back.

use async_trait::async_trait;
use serde::Deserialize;
use study_aid_core::domain::FlashcardDraft;
use study_aid_core::ports::{FlashcardGenerationService, PortError, PortResult};

use super::chat::{strip_code_fence, ChatModel, Sampling};

const SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 500,
};

fn prompt(summary: &str) -> String {
    format!(
        "Generate three flashcards from the following summary. \
         Return the result as JSON: a list where each element has 'front' and 'back' fields, \
         representing the question and answer.\n\nSummary:\n{summary}"
    )
}

/// A card as the model writes it. Some replies use `question`/`answer`.
#[derive(Debug, Deserialize)]
struct FlashcardRecord {
    front: Option<String>,
    back: Option<String>,
    question: Option<String>,
    answer: Option<String>,
}

fn first_non_empty(candidates: [Option<String>; 2]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

impl FlashcardRecord {
    fn to_domain(self) -> FlashcardDraft {
        FlashcardDraft {
            front: first_non_empty([self.front, self.question]),
            back: first_non_empty([self.back, self.answer]),
        }
    }
}

fn parse_flashcards(content: &str) -> PortResult<Vec<FlashcardDraft>> {
    let records: Vec<FlashcardRecord> = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| PortError::Unexpected(format!("Flashcard LLM returned invalid JSON: {e}")))?;
    Ok(records.into_iter().map(FlashcardRecord::to_domain).collect())
}

#[derive(Clone)]
pub struct OpenAiFlashcardAdapter {
    model: ChatModel,
}

impl OpenAiFlashcardAdapter {
    pub fn new(model: ChatModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl FlashcardGenerationService for OpenAiFlashcardAdapter {
    async fn generate_flashcards(&self, summary: &str) -> PortResult<Vec<FlashcardDraft>> {
        let content = self.model.complete(&prompt(summary), None, SAMPLING).await?;
        parse_flashcards(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_front_and_back() {
        let cards = parse_flashcards(r#"[{"front": "Q1", "back": "A1"}, {"front": "Q2", "back": "A2"}]"#)
            .unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1], FlashcardDraft { front: "Q2".into(), back: "A2".into() });
    }

    #[test]
    fn question_and_answer_fill_in_for_missing_sides() {
        let cards = parse_flashcards(
            "```json\n[{\"question\": \"What is ATP?\", \"answer\": \"Energy currency\", \"front\": \"\"}]\n```",
        )
        .unwrap();
        assert_eq!(cards[0].front, "What is ATP?");
        assert_eq!(cards[0].back, "Energy currency");
    }

    #[test]
    fn card_without_any_text_gets_empty_sides() {
        let cards = parse_flashcards(r#"[{}]"#).unwrap();
        assert_eq!(cards[0], FlashcardDraft { front: String::new(), back: String::new() });
    }

    #[test]
    fn prose_is_an_error() {
        assert!(parse_flashcards("Here are your flashcards!").is_err());
        assert!(parse_flashcards(r#"{"front": "Q", "back": "A"}"#).is_err());
    }
}
