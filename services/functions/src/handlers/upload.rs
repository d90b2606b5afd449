//! services/functions/src/handlers/upload.rs
//!
//! Stores a base64-encoded PDF sent as JSON in the uploads bucket.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use study_aid_core::domain::StoredDocument;
use study_aid_core::ports::ObjectStore;
use tracing::info;

use super::envelope::{decode_base64, ApiResponse, GatewayEvent, Payload};
use super::Handler;
use crate::config::{Config, UPLOADS_BUCKET_NAME};
use crate::error::HandlerError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_url: String,
}

pub struct UploadHandler {
    storage: Arc<dyn ObjectStore>,
    bucket: Option<String>,
}

impl UploadHandler {
    pub fn new(storage: Arc<dyn ObjectStore>, bucket: Option<String>) -> Self {
        Self { storage, bucket }
    }
}

/// The plain, unsigned URL of an object.
fn object_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/{key}")
}

#[async_trait]
impl Handler for UploadHandler {
    type Event = GatewayEvent;

    async fn handle(&self, event: GatewayEvent) -> Result<ApiResponse, HandlerError> {
        let bucket = match Config::require(self.bucket.as_deref(), UPLOADS_BUCKET_NAME) {
            Ok(bucket) => bucket,
            Err(e) => return Ok(ApiResponse::misconfigured(&e)),
        };

        let (file_name, encoded) = match Payload::from_event(&event).and_then(|payload| {
            let file_name = payload.required_str("fileName")?.to_string();
            let encoded = payload.required_str("fileContent")?.to_string();
            Ok((file_name, encoded))
        }) {
            Ok(fields) => fields,
            Err(e) => return Ok(e.into()),
        };

        let file = match decode_base64(&encoded) {
            Ok(file) => file,
            Err(e) => {
                return Ok(ApiResponse::bad_request(format!(
                    "Unable to decode fileContent: {e}"
                )))
            }
        };

        let size = file.len();
        self.storage
            .put_object(bucket, &file_name, file.into(), StoredDocument::PDF)
            .await?;
        info!(%bucket, key = %file_name, size, "Upload stored");

        ApiResponse::ok(&UploadResponse {
            file_url: object_url(bucket, &file_name),
        })
    }
}
