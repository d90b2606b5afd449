//! services/functions/src/handlers/performance.rs
//!
//! Aggregates every stored quiz result of a user.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use study_aid_core::domain::PerformanceSummary;
use study_aid_core::ports::QuizResultStore;

use super::envelope::{ApiResponse, GatewayEvent, Payload};
use super::Handler;
use crate::config::{Config, QUIZ_RESULTS_TABLE};
use crate::error::HandlerError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub user_id: String,
    pub total_quizzes: u64,
    pub total_score: u64,
    pub average_score: f64,
}

impl From<PerformanceSummary> for PerformanceResponse {
    fn from(summary: PerformanceSummary) -> Self {
        Self {
            user_id: summary.user_id,
            total_quizzes: summary.total_quizzes,
            total_score: summary.total_score,
            average_score: summary.average_score,
        }
    }
}

pub struct PerformanceHandler {
    results: Option<Arc<dyn QuizResultStore>>,
}

impl PerformanceHandler {
    pub fn new(results: Option<Arc<dyn QuizResultStore>>) -> Self {
        Self { results }
    }
}

#[async_trait]
impl Handler for PerformanceHandler {
    type Event = GatewayEvent;

    async fn handle(&self, event: GatewayEvent) -> Result<ApiResponse, HandlerError> {
        let user_id = match Payload::from_event(&event)
            .and_then(|payload| payload.required_str("userId").map(str::to_string))
        {
            Ok(user_id) => user_id,
            Err(e) => return Ok(e.into()),
        };

        let store = match Config::require(self.results.as_ref(), QUIZ_RESULTS_TABLE) {
            Ok(store) => store,
            Err(e) => return Ok(ApiResponse::misconfigured(&e)),
        };

        let results = store.results_for_user(&user_id).await?;
        let summary = PerformanceSummary::from_results(&user_id, &results);
        ApiResponse::ok(&PerformanceResponse::from(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{BrokenStore, MemoryResultStore};
    use serde_json::json;
    use study_aid_core::domain::QuizResult;

    fn result(user_id: &str, score: u32) -> QuizResult {
        QuizResult {
            user_id: user_id.to_string(),
            quiz_id: "q".to_string(),
            timestamp: 1_700_000_000,
            score,
            total_questions: 5,
        }
    }

    #[tokio::test]
    async fn user_without_results_has_zero_average() {
        let handler = PerformanceHandler::new(Some(Arc::new(MemoryResultStore::default())));
        let response = handler
            .handle(GatewayEvent::with_body(r#"{"userId": "new-user"}"#))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        let body = response.json_body().unwrap();
        assert_eq!(body["userId"], "new-user");
        assert_eq!(body["totalQuizzes"], 0);
        assert_eq!(body["totalScore"], 0);
        assert_eq!(body["averageScore"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn aggregates_only_the_requested_user() {
        let store = Arc::new(MemoryResultStore::default());
        store
            .results
            .lock()
            .unwrap()
            .extend([result("u1", 3), result("u1", 4), result("u2", 5)]);

        let response = PerformanceHandler::new(Some(store))
            .handle(GatewayEvent::with_body(r#"{"userId": "u1"}"#))
            .await
            .unwrap();

        assert_eq!(
            response.json_body().unwrap(),
            json!({ "userId": "u1", "totalQuizzes": 2, "totalScore": 7, "averageScore": 3.5 })
        );
    }

    #[tokio::test]
    async fn missing_user_id_is_a_bad_request() {
        let handler = PerformanceHandler::new(Some(Arc::new(MemoryResultStore::default())));
        let response = handler.handle(GatewayEvent::with_body("{}")).await.unwrap();

        assert_eq!(response.status_code, 400);
        let error = response.json_body().unwrap()["error"].as_str().unwrap().to_string();
        assert!(error.contains("userId"));
    }

    #[tokio::test]
    async fn missing_table_is_a_server_error() {
        let response = PerformanceHandler::new(None)
            .handle(GatewayEvent::with_body(r#"{"userId": "u1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.json_body().unwrap(),
            json!({ "error": "QUIZ_RESULTS_TABLE not configured" })
        );
    }

    #[tokio::test]
    async fn query_failure_is_fatal() {
        let result = PerformanceHandler::new(Some(Arc::new(BrokenStore)))
            .handle(GatewayEvent::with_body(r#"{"userId": "u1"}"#))
            .await;
        assert!(result.is_err());
    }
}
