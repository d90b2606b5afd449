//! services/functions/src/bin/generate_quiz.rs

use std::sync::Arc;

use functions_lib::{
    adapters::OpenAiQuizAdapter, config::Config, handlers::quiz::QuizHandler, runtime, telemetry,
};
use lambda_runtime::Error;
use study_aid_core::ports::QuizGenerationService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    let generator = runtime::chat_model(&config, &config.quiz_model)
        .map(|model| Arc::new(OpenAiQuizAdapter::new(model)) as Arc<dyn QuizGenerationService>);

    runtime::serve(QuizHandler::new(generator)).await
}
