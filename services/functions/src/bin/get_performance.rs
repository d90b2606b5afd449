//! services/functions/src/bin/get_performance.rs

use std::sync::Arc;

use functions_lib::{
    adapters::DynamoQuizResultStore, config::Config, handlers::performance::PerformanceHandler,
    runtime, telemetry,
};
use lambda_runtime::Error;
use study_aid_core::ports::QuizResultStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    let aws = aws_config::load_from_env().await;
    let results = config.quiz_results_table.clone().map(|table| {
        Arc::new(DynamoQuizResultStore::new(aws_sdk_dynamodb::Client::new(&aws), table))
            as Arc<dyn QuizResultStore>
    });

    runtime::serve(PerformanceHandler::new(results)).await
}
