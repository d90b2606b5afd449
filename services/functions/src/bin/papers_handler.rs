//! services/functions/src/bin/papers_handler.rs

use std::sync::Arc;

use functions_lib::{
    adapters::{HttpDocumentFetcher, S3Storage},
    config::Config,
    handlers::papers::PapersHandler,
    runtime, telemetry,
};
use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    let aws = aws_config::load_from_env().await;
    let handler = PapersHandler::new(
        Arc::new(S3Storage::new(aws_sdk_s3::Client::new(&aws))),
        Arc::new(HttpDocumentFetcher::new(reqwest::Client::new())),
        config.papers_bucket.clone(),
    );
    runtime::serve(handler).await
}
