//! In-memory stand-ins for the core ports, shared by the handler tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use study_aid_core::domain::{
    FlashcardDraft, Progress, ProgressIncrement, QuizQuestion, QuizResult,
};
use study_aid_core::ports::{
    DocumentFetcher, FlashcardGenerationService, ObjectStore, PortError, PortResult,
    ProgressStore, QuizGenerationService, QuizResultStore, SummarizationService,
    TextExtractionService, TokenVerificationService,
};

//=========================================================================================
// Storage
//=========================================================================================

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), (Bytes, String)>>,
}

impl MemoryObjectStore {
    pub fn insert(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (Bytes::copy_from_slice(body), "application/octet-stream".to_string()),
        );
    }

    /// Returns the stored body and content type.
    pub fn stored(&self, bucket: &str, key: &str) -> Option<(Bytes, String)> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> PortResult<Bytes> {
        self.stored(bucket, key)
            .map(|(body, _)| body)
            .ok_or_else(|| PortError::NotFound(format!("s3://{bucket}/{key}")))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> PortResult<()> {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (body, content_type.to_string()),
        );
        Ok(())
    }

    async fn list_keys(&self, bucket: &str) -> PortResult<Vec<String>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryResultStore {
    pub results: Mutex<Vec<QuizResult>>,
}

#[async_trait]
impl QuizResultStore for MemoryResultStore {
    async fn save_result(&self, result: &QuizResult) -> PortResult<()> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn results_for_user(&self, user_id: &str) -> PortResult<Vec<QuizResult>> {
        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryProgressStore {
    pub records: Mutex<HashMap<String, Progress>>,
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn record_activity(&self, increment: &ProgressIncrement) -> PortResult<Progress> {
        let mut records = self.records.lock().unwrap();
        let updated = Progress::apply(records.get(&increment.user_id), increment);
        records.insert(increment.user_id.clone(), updated.clone());
        Ok(updated)
    }
}

/// A store whose every call fails, for the fatal-error paths.
pub struct BrokenStore;

#[async_trait]
impl QuizResultStore for BrokenStore {
    async fn save_result(&self, _result: &QuizResult) -> PortResult<()> {
        Err(PortError::Unexpected("table unavailable".to_string()))
    }

    async fn results_for_user(&self, _user_id: &str) -> PortResult<Vec<QuizResult>> {
        Err(PortError::Unexpected("table unavailable".to_string()))
    }
}

//=========================================================================================
// Content
//=========================================================================================

/// Treats the "PDF" bytes as UTF-8 text with pages separated by form feeds.
/// Bodies starting with `%broken` fail to parse.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractionService for PlainTextExtractor {
    async fn extract_text(&self, pdf: Bytes) -> PortResult<String> {
        if pdf.starts_with(b"%broken") {
            return Err(PortError::Unexpected("PDF parse error: bad xref".to_string()));
        }
        let text = String::from_utf8(pdf.to_vec())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(text.split('\u{c}').collect::<Vec<_>>().join("\n"))
    }
}

/// Serves canned documents by URL; unknown URLs fail like a 404.
#[derive(Default)]
pub struct CannedFetcher {
    pub documents: HashMap<String, Bytes>,
}

#[async_trait]
impl DocumentFetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> PortResult<Bytes> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| PortError::Unexpected(format!("HTTP status client error (404 Not Found) for url ({url})")))
    }
}

//=========================================================================================
// Language model
//=========================================================================================

/// Answers every request with the scripted output, or fails when none is set.
#[derive(Default)]
pub struct ScriptedModel {
    pub summary: Option<String>,
    pub flashcards: Option<Vec<FlashcardDraft>>,
    pub questions: Option<Vec<QuizQuestion>>,
}

fn unavailable() -> PortError {
    PortError::Unexpected("model unavailable".to_string())
}

#[async_trait]
impl SummarizationService for ScriptedModel {
    async fn summarize(&self, _text: &str) -> PortResult<String> {
        self.summary.clone().ok_or_else(unavailable)
    }
}

#[async_trait]
impl FlashcardGenerationService for ScriptedModel {
    async fn generate_flashcards(&self, _summary: &str) -> PortResult<Vec<FlashcardDraft>> {
        self.flashcards.clone().ok_or_else(unavailable)
    }
}

#[async_trait]
impl QuizGenerationService for ScriptedModel {
    async fn generate_quiz(&self, _summary: &str) -> PortResult<Vec<QuizQuestion>> {
        self.questions.clone().ok_or_else(unavailable)
    }
}

//=========================================================================================
// Identity
//=========================================================================================

/// Accepts exactly one token.
pub struct StaticVerifier;

pub const VALID_TOKEN: &str = "valid-token";

#[async_trait]
impl TokenVerificationService for StaticVerifier {
    async fn verify_token(&self, token: &str) -> PortResult<Value> {
        if token == VALID_TOKEN {
            Ok(json!({ "sub": "user-123", "email": "student@example.com" }))
        } else {
            Err(PortError::Unauthorized("Token has expired".to_string()))
        }
    }
}
