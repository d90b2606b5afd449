//! services/functions/src/handlers/quiz.rs
//!
//! Generates multiple-choice questions from a summary. Responses always use
//! the `questions` key.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use study_aid_core::domain::QuizQuestion;
use study_aid_core::ports::QuizGenerationService;
use tracing::warn;

use super::envelope::{ApiResponse, GatewayEvent, Payload};
use super::Handler;
use crate::error::HandlerError;

#[derive(Debug, Serialize)]
pub struct QuestionBody {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl From<QuizQuestion> for QuestionBody {
    fn from(q: QuizQuestion) -> Self {
        Self {
            question: q.question,
            options: q.options,
            answer: q.answer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub questions: Vec<QuestionBody>,
}

pub struct QuizHandler {
    generator: Option<Arc<dyn QuizGenerationService>>,
}

impl QuizHandler {
    pub fn new(generator: Option<Arc<dyn QuizGenerationService>>) -> Self {
        Self { generator }
    }

    async fn questions(&self, summary: &str) -> Vec<QuizQuestion> {
        match &self.generator {
            Some(generator) => generator.generate_quiz(summary).await.unwrap_or_else(|e| {
                warn!(error = %e, "Quiz generation failed, using placeholder question");
                vec![QuizQuestion::placeholder()]
            }),
            None => vec![QuizQuestion::placeholder()],
        }
    }
}

#[async_trait]
impl Handler for QuizHandler {
    type Event = GatewayEvent;

    async fn handle(&self, event: GatewayEvent) -> Result<ApiResponse, HandlerError> {
        let summary = match Payload::from_event(&event)
            .and_then(|payload| payload.required_str("summary").map(str::to_string))
        {
            Ok(summary) => summary,
            Err(e) => return Ok(e.into()),
        };

        let questions = self
            .questions(&summary)
            .await
            .into_iter()
            .map(QuestionBody::from)
            .collect();

        ApiResponse::ok(&QuizResponse { questions })
    }
}
