pub mod chat;
pub mod dynamo;
pub mod firebase_auth;
pub mod flashcard_llm;
pub mod http_fetch;
pub mod pdf;
pub mod quiz_llm;
pub mod s3;
pub mod summary_llm;

pub use chat::ChatModel;
pub use dynamo::{DynamoProgressStore, DynamoQuizResultStore};
pub use firebase_auth::{shared_verifier, FirebaseSettings, FirebaseTokenVerifier};
pub use flashcard_llm::OpenAiFlashcardAdapter;
pub use http_fetch::HttpDocumentFetcher;
pub use pdf::PdfTextExtractor;
pub use quiz_llm::OpenAiQuizAdapter;
pub use s3::S3Storage;
pub use summary_llm::OpenAiSummaryAdapter;
