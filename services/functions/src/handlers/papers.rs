//! services/functions/src/handlers/papers.rs
//!
//! Manages the reference exam papers kept in the documents bucket. The event
//! names an `action`: `download_papers` mirrors a fixed set of official PDFs
//! into the bucket, `list_papers` enumerates what is stored.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use study_aid_core::domain::StoredDocument;
use study_aid_core::ports::{DocumentFetcher, ObjectStore};
use tracing::{info, warn};

use super::envelope::ApiResponse;
use super::Handler;
use crate::config::{Config, BUCKET_NAME};
use crate::error::HandlerError;

/// Official papers, in download order, by the name they are stored under.
pub const EXAM_PAPERS: [(&str, &str); 3] = [
    (
        "UPSC_Civil_Services_Prelims_2024_GS_Paper_I",
        "https://upsc.gov.in/sites/default/files/QP-CSP-24-GENERAL-STUDIES-PAPER-I-180624.pdf",
    ),
    (
        "UPSC_Civil_Services_Prelims_2024_GS_Paper_II",
        "https://upsc.gov.in/sites/default/files/QP-CSP-24-GENERAL-STUDIES-PAPER-II-180624.pdf",
    ),
    (
        "SSC_Model_Question_Paper_English",
        "https://ssc.nic.in/Downloads/portal/english/modal-question-paper-english.pdf",
    ),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PapersEvent {
    #[serde(default)]
    pub action: Option<Value>,
}

impl PapersEvent {
    /// The action as it appears in error messages; `None` when absent.
    fn action_label(&self) -> String {
        match &self.action {
            None | Some(Value::Null) => "None".to_string(),
            Some(Value::String(action)) => action.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub saved: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

pub struct PapersHandler {
    storage: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn DocumentFetcher>,
    bucket: Option<String>,
}

impl PapersHandler {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn DocumentFetcher>,
        bucket: Option<String>,
    ) -> Self {
        Self {
            storage,
            fetcher,
            bucket,
        }
    }

    /// Downloads one paper into the bucket and returns its key.
    async fn mirror(&self, bucket: &str, name: &str, url: &str) -> Result<String, String> {
        let document = StoredDocument::paper(name);
        let body = self.fetcher.fetch(url).await.map_err(|e| e.to_string())?;
        self.storage
            .put_object(bucket, &document.key, body, document.content_type)
            .await
            .map_err(|e| e.to_string())?;
        Ok(document.key)
    }

    /// Each paper is attempted independently; a failure is recorded in place of
    /// its key and never aborts the rest.
    async fn download_papers(&self, bucket: &str) -> Result<ApiResponse, HandlerError> {
        let mut saved = Vec::with_capacity(EXAM_PAPERS.len());
        for (name, url) in EXAM_PAPERS {
            match self.mirror(bucket, name, url).await {
                Ok(key) => {
                    info!(%bucket, %key, "Paper stored");
                    saved.push(key);
                }
                Err(reason) => {
                    warn!(%url, error = %reason, "Paper download failed");
                    saved.push(format!("{}: error {reason}", StoredDocument::paper(name).key));
                }
            }
        }
        ApiResponse::ok(&SavedResponse { saved })
    }

    async fn list_papers(&self, bucket: &str) -> Result<ApiResponse, HandlerError> {
        let files = self.storage.list_keys(bucket).await?;
        ApiResponse::ok(&FilesResponse { files })
    }
}

#[async_trait]
impl Handler for PapersHandler {
    type Event = PapersEvent;

    async fn handle(&self, event: PapersEvent) -> Result<ApiResponse, HandlerError> {
        let action = event.action.as_ref().and_then(Value::as_str);
        if !matches!(action, Some("download_papers" | "list_papers")) {
            return Ok(ApiResponse::bad_request(format!(
                "Unsupported action: {}",
                event.action_label()
            )));
        }

        let bucket = match Config::require(self.bucket.as_deref(), BUCKET_NAME) {
            Ok(bucket) => bucket,
            Err(e) => return Ok(ApiResponse::misconfigured(&e)),
        };

        match action {
            Some("download_papers") => self.download_papers(bucket).await,
            _ => self.list_papers(bucket).await,
        }
    }
}
