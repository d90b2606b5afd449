//! services/functions/src/handlers/extract_text.rs
//!
//! Triggered by object-created notifications on the uploads bucket. Pulls each
//! new PDF, extracts its text, and either writes the text next to it under
//! `extracted/` or returns it inline.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use study_aid_core::domain::StoredDocument;
use study_aid_core::ports::{ObjectStore, TextExtractionService};
use tracing::{debug, info};

use super::envelope::ApiResponse;
use super::Handler;
use crate::error::HandlerError;

//=========================================================================================
// Notification Event
//=========================================================================================

/// The subset of an S3 notification this function reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3NotificationRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3NotificationRecord {
    #[serde(default)]
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Entity {
    #[serde(default)]
    pub bucket: S3Bucket,
    #[serde(default)]
    pub object: S3Object,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Bucket {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Object {
    #[serde(default)]
    pub key: Option<String>,
}

impl S3NotificationRecord {
    fn location(&self) -> Option<(&str, &str)> {
        let bucket = self.s3.bucket.name.as_deref().filter(|b| !b.is_empty())?;
        let key = self.s3.object.key.as_deref().filter(|k| !k.is_empty())?;
        Some((bucket, key))
    }
}

//=========================================================================================
// Response Payload
//=========================================================================================

/// What happened to one uploaded object.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    Stored { source: String, destination: String },
    Inline { source: String, text: String },
}

//=========================================================================================
// Handler
//=========================================================================================

pub struct ExtractTextHandler {
    storage: Arc<dyn ObjectStore>,
    extractor: Arc<dyn TextExtractionService>,
    uploads_bucket: Option<String>,
    extracted_bucket: Option<String>,
}

impl ExtractTextHandler {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        extractor: Arc<dyn TextExtractionService>,
        uploads_bucket: Option<String>,
        extracted_bucket: Option<String>,
    ) -> Self {
        Self {
            storage,
            extractor,
            uploads_bucket,
            extracted_bucket,
        }
    }

    async fn extract_one(&self, bucket: &str, key: &str) -> Result<ExtractionOutcome, HandlerError> {
        let pdf = self.storage.get_object(bucket, key).await?;
        let text = self.extractor.extract_text(pdf).await?;

        let Some(destination_bucket) = &self.extracted_bucket else {
            return Ok(ExtractionOutcome::Inline {
                source: key.to_string(),
                text,
            });
        };

        let destination = StoredDocument::extracted_text_for(key);
        self.storage
            .put_object(
                destination_bucket,
                &destination.key,
                text.into_bytes().into(),
                destination.content_type,
            )
            .await?;

        Ok(ExtractionOutcome::Stored {
            source: key.to_string(),
            destination: destination.key,
        })
    }
}

#[async_trait]
impl Handler for ExtractTextHandler {
    type Event = S3Notification;

    /// Any fetch, extraction or write failure aborts the whole batch.
    async fn handle(&self, event: S3Notification) -> Result<ApiResponse, HandlerError> {
        let mut outcomes = Vec::new();

        for record in &event.records {
            let Some((bucket, key)) = record.location() else {
                debug!("Skipping record without bucket or key");
                continue;
            };
            if let Some(expected) = &self.uploads_bucket {
                if bucket != expected {
                    debug!(bucket, "Skipping object from an unexpected bucket");
                    continue;
                }
            }

            outcomes.push(self.extract_one(bucket, key).await?);
        }

        info!(extracted = outcomes.len(), "Text extraction finished");
        ApiResponse::ok(&outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{MemoryObjectStore, PlainTextExtractor};
    use serde_json::json;

    fn notification(entries: serde_json::Value) -> S3Notification {
        serde_json::from_value(entries).unwrap()
    }

    fn record(bucket: &str, key: &str) -> serde_json::Value {
        json!({ "s3": { "bucket": { "name": bucket }, "object": { "key": key } } })
    }

    fn handler(
        storage: Arc<MemoryObjectStore>,
        uploads: Option<&str>,
        extracted: Option<&str>,
    ) -> ExtractTextHandler {
        ExtractTextHandler::new(
            storage,
            Arc::new(PlainTextExtractor),
            uploads.map(str::to_string),
            extracted.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn returns_text_inline_without_destination_bucket() {
        let storage = Arc::new(MemoryObjectStore::default());
        storage.insert("uploads", "notes/week1.pdf", b"page one\x0cpage two");

        let response = handler(storage, Some("uploads"), None)
            .handle(notification(json!({ "Records": [record("uploads", "notes/week1.pdf")] })))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.json_body().unwrap(),
            json!([{ "source": "notes/week1.pdf", "text": "page one\npage two" }])
        );
    }

    #[tokio::test]
    async fn writes_text_to_destination_bucket() {
        let storage = Arc::new(MemoryObjectStore::default());
        storage.insert("uploads", "lecture.pdf", b"photosynthesis");

        let response = handler(storage.clone(), Some("uploads"), Some("texts"))
            .handle(notification(json!({ "Records": [record("uploads", "lecture.pdf")] })))
            .await
            .unwrap();

        assert_eq!(
            response.json_body().unwrap(),
            json!([{ "source": "lecture.pdf", "destination": "extracted/lecture.txt" }])
        );
        let (body, content_type) = storage.stored("texts", "extracted/lecture.txt").unwrap();
        assert_eq!(&body[..], b"photosynthesis");
        assert_eq!(content_type, "text/plain");
    }

    #[tokio::test]
    async fn skips_foreign_buckets_and_incomplete_records() {
        let storage = Arc::new(MemoryObjectStore::default());
        storage.insert("uploads", "a.pdf", b"alpha");
        storage.insert("elsewhere", "b.pdf", b"beta");

        let event = notification(json!({ "Records": [
            record("elsewhere", "b.pdf"),
            { "s3": { "bucket": { "name": "uploads" } } },
            { "s3": { "object": { "key": "a.pdf" } } },
            record("uploads", "a.pdf"),
        ] }));
        let response = handler(storage, Some("uploads"), None).handle(event).await.unwrap();

        assert_eq!(
            response.json_body().unwrap(),
            json!([{ "source": "a.pdf", "text": "alpha" }])
        );
    }

    #[tokio::test]
    async fn any_bucket_is_accepted_without_source_filter() {
        let storage = Arc::new(MemoryObjectStore::default());
        storage.insert("elsewhere", "b.pdf", b"beta");

        let response = handler(storage, None, None)
            .handle(notification(json!({ "Records": [record("elsewhere", "b.pdf")] })))
            .await
            .unwrap();

        assert_eq!(response.json_body().unwrap().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_notification_yields_empty_list() {
        let storage = Arc::new(MemoryObjectStore::default());
        let response = handler(storage, Some("uploads"), None)
            .handle(S3Notification::default())
            .await
            .unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.json_body().unwrap(), json!([]));
    }

    #[tokio::test]
    async fn extraction_failure_aborts_the_batch() {
        let storage = Arc::new(MemoryObjectStore::default());
        storage.insert("uploads", "good.pdf", b"fine");
        storage.insert("uploads", "bad.pdf", b"%broken");

        let event = notification(json!({ "Records": [
            record("uploads", "good.pdf"),
            record("uploads", "bad.pdf"),
        ] }));
        let result = handler(storage, Some("uploads"), None).handle(event).await;

        assert!(matches!(result, Err(HandlerError::Port(_))));
    }

    #[tokio::test]
    async fn missing_object_is_fatal() {
        let storage = Arc::new(MemoryObjectStore::default());
        let result = handler(storage, Some("uploads"), None)
            .handle(notification(json!({ "Records": [record("uploads", "gone.pdf")] })))
            .await;
        assert!(result.is_err());
    }
}
