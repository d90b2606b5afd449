//! services/functions/src/handlers/verify_token.rs
//!
//! Validates a Firebase ID token carried as a bearer credential and echoes its
//! claims.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use study_aid_core::ports::{PortError, TokenVerificationService};
use tracing::{debug, warn};

use super::envelope::{ApiResponse, GatewayEvent};
use super::Handler;
use crate::config::ConfigError;
use crate::error::HandlerError;

/// Resolves the verifier on first use. Resolution fails when the identity
/// provider is not configured.
pub type VerifierSource =
    Box<dyn Fn() -> Result<Arc<dyn TokenVerificationService>, ConfigError> + Send + Sync>;

#[derive(Debug, Serialize)]
pub struct ClaimsResponse {
    pub claims: Value,
}

pub struct VerifyTokenHandler {
    verifier: VerifierSource,
}

impl VerifyTokenHandler {
    pub fn new(verifier: VerifierSource) -> Self {
        Self { verifier }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(event: &GatewayEvent) -> Result<&str, &'static str> {
    let header = ["authorization", "Authorization"]
        .into_iter()
        .filter_map(|name| event.header(name))
        .find(|value| !value.is_empty())
        .ok_or("Missing Authorization header")?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err("Invalid authorization format"),
    }
}

/// Checks a bearer token against `verifier`.
pub async fn authorize(
    token: &str,
    verifier: &dyn TokenVerificationService,
) -> Result<ApiResponse, HandlerError> {
    match verifier.verify_token(token).await {
        Ok(claims) => {
            debug!(sub = ?claims.get("sub"), "Token verified");
            ApiResponse::ok(&ClaimsResponse { claims })
        }
        Err(e) => {
            let reason = match e {
                PortError::Unauthorized(reason) => reason,
                other => other.to_string(),
            };
            warn!(%reason, "Token rejected");
            Ok(ApiResponse::unauthorized(format!(
                "Token verification failed: {reason}"
            )))
        }
    }
}

#[async_trait]
impl Handler for VerifyTokenHandler {
    type Event = GatewayEvent;

    /// The header is checked before the verifier is resolved, so a request
    /// without a usable token is a 401 even when the provider is unconfigured.
    async fn handle(&self, event: GatewayEvent) -> Result<ApiResponse, HandlerError> {
        let token = match bearer_token(&event) {
            Ok(token) => token,
            Err(message) => return Ok(ApiResponse::unauthorized(message)),
        };

        let verifier = match (self.verifier)() {
            Ok(verifier) => verifier,
            Err(e) => return Ok(ApiResponse::misconfigured(&e)),
        };
        authorize(token, verifier.as_ref()).await
    }
}
