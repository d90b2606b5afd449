//! services/functions/src/bin/jwt_verify.rs

use functions_lib::{
    adapters::shared_verifier, config::Config, handlers::verify_token::VerifyTokenHandler,
    runtime, telemetry,
};
use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    // Resolved per invocation; a missing project id is a 500, not a failed start.
    let handler = VerifyTokenHandler::new(Box::new(move || shared_verifier(&config)));
    runtime::serve(handler).await
}
