//! services/functions/src/bin/save_progress.rs

use std::sync::Arc;

use functions_lib::{
    adapters::DynamoProgressStore, config::Config, handlers::progress::ProgressHandler, runtime,
    telemetry,
};
use lambda_runtime::Error;
use study_aid_core::ports::ProgressStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    let aws = aws_config::load_from_env().await;
    let progress = config.progress_table.clone().map(|table| {
        Arc::new(DynamoProgressStore::new(aws_sdk_dynamodb::Client::new(&aws), table))
            as Arc<dyn ProgressStore>
    });

    runtime::serve(ProgressHandler::new(progress)).await
}
