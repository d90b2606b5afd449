//! services/functions/src/bin/flashcard_generator.rs

use std::sync::Arc;

use functions_lib::{
    adapters::OpenAiFlashcardAdapter, config::Config, handlers::flashcards::FlashcardsHandler,
    runtime, telemetry,
};
use lambda_runtime::Error;
use study_aid_core::ports::FlashcardGenerationService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    let generator = runtime::chat_model(&config, &config.flashcard_model).map(|model| {
        Arc::new(OpenAiFlashcardAdapter::new(model)) as Arc<dyn FlashcardGenerationService>
    });

    runtime::serve(FlashcardsHandler::new(generator)).await
}
