//! services/functions/src/runtime.rs
//!
//! Process bootstrap shared by the function binaries: model clients and the
//! Lambda runtime loop.

use std::sync::Arc;

use async_openai::{config::OpenAIConfig, Client};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::{error, info};

use crate::adapters::ChatModel;
use crate::config::Config;
use crate::handlers::Handler;

/// A chat model for `model`, or `None` when no API key is configured.
pub fn chat_model(config: &Config, model: &str) -> Option<ChatModel> {
    let api_key = config.openai_api_key.as_deref()?;
    let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
    info!(%model, "Language model configured");
    Some(ChatModel::new(client, model.to_string()))
}

/// Serves invocations with `handler` until the runtime shuts down.
pub async fn serve<H: Handler>(handler: H) -> Result<(), Error> {
    let handler = Arc::new(handler);

    run(service_fn(move |event: LambdaEvent<H::Event>| {
        let handler = Arc::clone(&handler);
        async move {
            let request_id = event.context.request_id.clone();
            match handler.handle(event.payload).await {
                Ok(response) => {
                    info!(%request_id, status = response.status_code, "Invocation complete");
                    Ok(response)
                }
                Err(e) => {
                    error!(%request_id, error = %e, "Invocation failed");
                    Err(Error::from(e))
                }
            }
        }
    }))
    .await
}
