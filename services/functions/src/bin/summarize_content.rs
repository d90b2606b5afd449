//! services/functions/src/bin/summarize_content.rs

use std::sync::Arc;

use functions_lib::{
    adapters::{OpenAiSummaryAdapter, PdfTextExtractor},
    config::Config,
    handlers::summarize::SummarizeHandler,
    runtime, telemetry,
};
use lambda_runtime::Error;
use study_aid_core::ports::SummarizationService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    let summarizer = runtime::chat_model(&config, &config.summary_model)
        .map(|model| Arc::new(OpenAiSummaryAdapter::new(model)) as Arc<dyn SummarizationService>);

    runtime::serve(SummarizeHandler::new(summarizer, Arc::new(PdfTextExtractor))).await
}
