pub mod domain;
pub mod ports;

pub use domain::{
    Flashcard, FlashcardDraft, PerformanceSummary, Progress, ProgressIncrement, QuizQuestion,
    QuizResult, StoredDocument,
};
pub use ports::{
    DocumentFetcher, FlashcardGenerationService, ObjectStore, PortError, PortResult,
    ProgressStore, QuizGenerationService, QuizResultStore, SummarizationService,
    TextExtractionService, TokenVerificationService,
};
