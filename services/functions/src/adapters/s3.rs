//! services/functions/src/adapters/s3.rs
//!
//! The object storage adapter, implementing the `ObjectStore` port on S3.

use async_trait::async_trait;
use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream, Client};
use bytes::Bytes;
use study_aid_core::ports::{ObjectStore, PortError, PortResult};

/// An adapter that implements `ObjectStore` with the AWS S3 SDK.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn unexpected(e: impl std::error::Error) -> PortError {
    PortError::Unexpected(DisplayErrorContext(e).to_string())
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn get_object(&self, bucket: &str, key: &str) -> PortResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    PortError::NotFound(format!("s3://{bucket}/{key}"))
                } else {
                    unexpected(e)
                }
            })?;

        let body = output.body.collect().await.map_err(unexpected)?;
        Ok(body.into_bytes())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> PortResult<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    /// Follows continuation tokens until the listing is exhausted.
    async fn list_keys(&self, bucket: &str) -> PortResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(unexpected)?;

            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(keys)
    }
}
