//! services/functions/src/handlers/submit_quiz.rs
//!
//! Scores a quiz submission and records the result when a results table is
//! configured.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use study_aid_core::domain::QuizResult;
use study_aid_core::ports::QuizResultStore;
use tracing::{debug, info};

use super::envelope::{ApiResponse, GatewayEvent, Payload, RequestError};
use super::Handler;
use crate::error::HandlerError;

const UNKNOWN_QUIZ: &str = "unknown";

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub score: u32,
}

struct Submission {
    user_id: String,
    quiz_id: String,
    answers: Vec<String>,
    correct_answers: Vec<String>,
}

impl Submission {
    fn from_payload(payload: &Payload) -> Result<Self, RequestError> {
        Ok(Self {
            user_id: payload.required_str("userId")?.to_string(),
            quiz_id: payload.optional_str("quizId", UNKNOWN_QUIZ)?.to_string(),
            answers: payload.required_str_list("answers")?,
            correct_answers: payload.required_str_list("correctAnswers")?,
        })
    }
}

pub struct SubmitQuizHandler {
    results: Option<Arc<dyn QuizResultStore>>,
}

impl SubmitQuizHandler {
    pub fn new(results: Option<Arc<dyn QuizResultStore>>) -> Self {
        Self { results }
    }
}

#[async_trait]
impl Handler for SubmitQuizHandler {
    type Event = GatewayEvent;

    async fn handle(&self, event: GatewayEvent) -> Result<ApiResponse, HandlerError> {
        let submission = match Payload::from_event(&event).and_then(|p| Submission::from_payload(&p)) {
            Ok(submission) => submission,
            Err(e) => return Ok(e.into()),
        };

        let result = QuizResult::grade(
            &submission.user_id,
            &submission.quiz_id,
            &submission.answers,
            &submission.correct_answers,
            Utc::now().timestamp(),
        );

        match &self.results {
            Some(store) => {
                store.save_result(&result).await?;
                info!(user_id = %result.user_id, quiz_id = %result.quiz_id, score = result.score, "Quiz result saved");
            }
            None => debug!("No results table configured, result not persisted"),
        }

        ApiResponse::ok(&ScoreResponse {
            score: result.score,
        })
    }
}
