//! services/functions/src/adapters/http_fetch.rs
//!
//! Downloads documents over HTTP, implementing `DocumentFetcher` with `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use study_aid_core::ports::{DocumentFetcher, PortError, PortResult};

#[derive(Clone, Default)]
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
}

impl HttpDocumentFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    /// Any non-2xx status is a failure.
    async fn fetch(&self, url: &str) -> PortResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        response
            .bytes()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
