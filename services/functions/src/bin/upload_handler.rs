//! services/functions/src/bin/upload_handler.rs

use std::sync::Arc;

use functions_lib::{
    adapters::S3Storage, config::Config, handlers::upload::UploadHandler, runtime, telemetry,
};
use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    let aws = aws_config::load_from_env().await;
    let handler = UploadHandler::new(
        Arc::new(S3Storage::new(aws_sdk_s3::Client::new(&aws))),
        config.uploads_bucket.clone(),
    );
    runtime::serve(handler).await
}
