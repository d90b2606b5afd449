//! services/functions/src/bin/extract_text.rs

use std::sync::Arc;

use functions_lib::{
    adapters::{PdfTextExtractor, S3Storage},
    config::Config,
    handlers::extract_text::ExtractTextHandler,
    runtime, telemetry,
};
use lambda_runtime::Error;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    let aws = aws_config::load_from_env().await;
    let storage = Arc::new(S3Storage::new(aws_sdk_s3::Client::new(&aws)));

    let handler = ExtractTextHandler::new(
        storage,
        Arc::new(PdfTextExtractor),
        config.uploads_bucket.clone(),
        config.extracted_bucket.clone(),
    );
    info!(
        uploads = ?config.uploads_bucket,
        extracted = ?config.extracted_bucket,
        "Text extraction function starting"
    );
    runtime::serve(handler).await
}
