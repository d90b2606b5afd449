//! crates/study_aid_core/src/ports.rs
//!
//! Defines the service contracts (traits) the handlers depend on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! handlers independent of S3, DynamoDB, OpenAI, Firebase and HTTP specifics.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::domain::{FlashcardDraft, Progress, ProgressIncrement, QuizQuestion, QuizResult};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., storage, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports
//=========================================================================================

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads the full body of an object.
    async fn get_object(&self, bucket: &str, key: &str) -> PortResult<Bytes>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> PortResult<()>;

    /// Lists every key in the bucket.
    async fn list_keys(&self, bucket: &str) -> PortResult<Vec<String>>;
}

#[async_trait]
pub trait QuizResultStore: Send + Sync {
    async fn save_result(&self, result: &QuizResult) -> PortResult<()>;

    async fn results_for_user(&self, user_id: &str) -> PortResult<Vec<QuizResult>>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Atomically folds one activity into the user's record and returns the new state.
    async fn record_activity(&self, increment: &ProgressIncrement) -> PortResult<Progress>;
}

//=========================================================================================
// Content Ports
//=========================================================================================

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Extracts the text of a PDF, one page per line group.
    async fn extract_text(&self, pdf: Bytes) -> PortResult<String>;
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Downloads a document, failing on non-success statuses.
    async fn fetch(&self, url: &str) -> PortResult<Bytes>;
}

//=========================================================================================
// Language Model Ports
//=========================================================================================

#[async_trait]
pub trait SummarizationService: Send + Sync {
    async fn summarize(&self, text: &str) -> PortResult<String>;
}

#[async_trait]
pub trait FlashcardGenerationService: Send + Sync {
    async fn generate_flashcards(&self, summary: &str) -> PortResult<Vec<FlashcardDraft>>;
}

#[async_trait]
pub trait QuizGenerationService: Send + Sync {
    async fn generate_quiz(&self, summary: &str) -> PortResult<Vec<QuizQuestion>>;
}

//=========================================================================================
// Identity Port
//=========================================================================================

#[async_trait]
pub trait TokenVerificationService: Send + Sync {
    /// Verifies an ID token and returns its decoded claims.
    async fn verify_token(&self, token: &str) -> PortResult<Value>;
}
