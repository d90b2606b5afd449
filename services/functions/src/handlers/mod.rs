//! services/functions/src/handlers/mod.rs
//!
//! One module per Lambda function. Handlers only see the core ports, so every
//! function can be exercised against in-memory fakes.

pub mod envelope;
pub mod extract_text;
pub mod flashcards;
pub mod papers;
pub mod performance;
pub mod progress;
pub mod quiz;
pub mod submit_quiz;
pub mod summarize;
pub mod upload;
pub mod verify_token;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::HandlerError;
use envelope::ApiResponse;

/// A single request-triggered unit of logic.
///
/// Input problems become 4xx/5xx responses; an `Err` means the invocation
/// itself failed and is reported to the Lambda runtime as such.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    type Event: DeserializeOwned + Send + 'static;

    async fn handle(&self, event: Self::Event) -> Result<ApiResponse, HandlerError>;
}
