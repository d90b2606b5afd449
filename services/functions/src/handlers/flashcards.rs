//! services/functions/src/handlers/flashcards.rs
//!
//! Turns a summary into flashcards for one topic.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use study_aid_core::domain::{Flashcard, FlashcardDraft};
use study_aid_core::ports::FlashcardGenerationService;
use tracing::warn;
use uuid::Uuid;

use super::envelope::{ApiResponse, GatewayEvent, Payload};
use super::Handler;
use crate::error::HandlerError;

const DEFAULT_TOPIC: &str = "general";

/// A flashcard in the shape the front-end expects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardBody {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub topic_id: String,
}

impl From<Flashcard> for FlashcardBody {
    fn from(card: Flashcard) -> Self {
        Self {
            id: card.id,
            front: card.front,
            back: card.back,
            topic_id: card.topic_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FlashcardsResponse {
    pub flashcards: Vec<FlashcardBody>,
}

pub struct FlashcardsHandler {
    generator: Option<Arc<dyn FlashcardGenerationService>>,
}

impl FlashcardsHandler {
    pub fn new(generator: Option<Arc<dyn FlashcardGenerationService>>) -> Self {
        Self { generator }
    }

    async fn drafts(&self, summary: &str) -> Vec<FlashcardDraft> {
        let Some(generator) = &self.generator else {
            return vec![FlashcardDraft::placeholder()];
        };

        generator
            .generate_flashcards(summary)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Flashcard generation failed, using placeholder card");
                vec![FlashcardDraft::placeholder()]
            })
    }
}

#[async_trait]
impl Handler for FlashcardsHandler {
    type Event = GatewayEvent;

    /// An empty `summary` is still a present one and is processed.
    async fn handle(&self, event: GatewayEvent) -> Result<ApiResponse, HandlerError> {
        let (summary, topic_id) = match Payload::from_event(&event).and_then(|payload| {
            let summary = payload.required_str("summary")?.to_string();
            let topic_id = payload.optional_str("topicId", DEFAULT_TOPIC)?.to_string();
            Ok((summary, topic_id))
        }) {
            Ok(fields) => fields,
            Err(e) => return Ok(e.into()),
        };

        let flashcards = self
            .drafts(&summary)
            .await
            .into_iter()
            .map(|draft| FlashcardBody::from(Flashcard::from_draft(draft, &topic_id)))
            .collect();

        ApiResponse::ok(&FlashcardsResponse { flashcards })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::ScriptedModel;
    use serde_json::{json, Value};

    fn handler(model: Option<ScriptedModel>) -> FlashcardsHandler {
        FlashcardsHandler::new(model.map(|m| Arc::new(m) as Arc<dyn FlashcardGenerationService>))
    }

    async fn cards(handler: &FlashcardsHandler, body: Value) -> (u16, Value) {
        let response = handler
            .handle(GatewayEvent::with_body(body.to_string()))
            .await
            .unwrap();
        (response.status_code, response.json_body().unwrap())
    }

    #[tokio::test]
    async fn empty_summary_is_accepted() {
        let (status, body) = cards(&handler(None), json!({ "summary": "" })).await;
        assert_eq!(status, 200);
        assert_eq!(body["flashcards"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_summary_is_rejected() {
        let (status, body) = cards(&handler(None), json!({ "topicId": "bio" })).await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("summary"));
    }

    #[tokio::test]
    async fn placeholder_is_normalized_without_model() {
        let (_, body) = cards(&handler(None), json!({ "summary": "Cells" })).await;
        let card = &body["flashcards"][0];
        assert_eq!(card["front"], "What is the purpose of flashcards?");
        assert_eq!(
            card["back"],
            "Flashcards are used as a study aid to improve memory through spaced repetition."
        );
        assert_eq!(card["topicId"], "general");
        assert!(Uuid::parse_str(card["id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn generated_cards_get_topic_and_unique_ids() {
        let model = ScriptedModel {
            flashcards: Some(vec![
                FlashcardDraft { front: "Q1".into(), back: "A1".into() },
                FlashcardDraft { front: "Q2".into(), back: "A2".into() },
                FlashcardDraft { front: "Q3".into(), back: "A3".into() },
            ]),
            ..Default::default()
        };
        let (status, body) =
            cards(&handler(Some(model)), json!({ "summary": "Cells", "topicId": "biology" })).await;

        assert_eq!(status, 200);
        let cards = body["flashcards"].as_array().unwrap();
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|c| c["topicId"] == "biology"));
        assert_eq!(cards[1]["front"], "Q2");
        assert_eq!(cards[1]["back"], "A2");
        let ids: std::collections::HashSet<&str> =
            cards.iter().map(|c| c["id"].as_str().unwrap()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_placeholder() {
        let (status, body) =
            cards(&handler(Some(ScriptedModel::default())), json!({ "summary": "Cells" })).await;
        assert_eq!(status, 200);
        let cards = body["flashcards"].as_array().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["front"], "What is the purpose of flashcards?");
    }

    #[tokio::test]
    async fn null_topic_uses_default() {
        let (_, body) =
            cards(&handler(None), json!({ "summary": "Cells", "topicId": null })).await;
        assert_eq!(body["flashcards"][0]["topicId"], "general");
    }
}
