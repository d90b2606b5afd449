//! services/functions/src/adapters/firebase_auth.rs
//!
//! Verifies Firebase ID tokens, implementing `TokenVerificationService`.
//!
//! A token is accepted when it is RS256-signed by one of Google's secure-token
//! keys (picked by the header's `kid`), is unexpired, was issued for the
//! configured project and names a subject. The public keys are fetched on
//! first use and refetched when a token refers to an unknown key, at most once
//! per [`MIN_REFRESH_INTERVAL`].

use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use study_aid_core::ports::{PortError, PortResult, TokenVerificationService};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::{Config, ConfigError, FIREBASE_PROJECT_ID, GOOGLE_APPLICATION_CREDENTIALS};

const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Unknown key ids inside this window after a fetch are rejected without
/// another fetch.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

//=========================================================================================
// Settings
//=========================================================================================

/// The identity-provider project tokens must belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseSettings {
    pub project_id: String,
}

#[derive(Deserialize)]
struct ServiceAccountFile {
    project_id: Option<String>,
}

impl FirebaseSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::resolve(
            config.firebase_project_id.as_deref(),
            config.google_application_credentials.as_deref(),
        )
    }

    /// An explicit project id wins; otherwise it is read from the service
    /// account file.
    pub fn resolve(
        project_id: Option<&str>,
        credentials: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(project_id) = project_id {
            return Ok(Self {
                project_id: project_id.to_string(),
            });
        }

        let Some(path) = credentials else {
            return Err(ConfigError::MissingVar(FIREBASE_PROJECT_ID.to_string()));
        };

        let invalid = |reason: String| {
            ConfigError::InvalidValue(GOOGLE_APPLICATION_CREDENTIALS.to_string(), reason)
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|e| invalid(format!("cannot read '{}': {e}", path.display())))?;
        let account: ServiceAccountFile = serde_json::from_str(&raw)
            .map_err(|e| invalid(format!("'{}' is not a service account file: {e}", path.display())))?;

        account
            .project_id
            .filter(|id| !id.is_empty())
            .map(|project_id| Self { project_id })
            .ok_or_else(|| ConfigError::MissingVar(FIREBASE_PROJECT_ID.to_string()))
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }
}

//=========================================================================================
// Verifier
//=========================================================================================

#[derive(Default)]
struct KeyCache {
    keys: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn find(&self, kid: &str) -> Option<PortResult<DecodingKey>> {
        let jwk = self.keys.as_ref()?.find(kid)?;
        Some(DecodingKey::from_jwk(jwk).map_err(|e| PortError::Unexpected(e.to_string())))
    }

    fn fetched_recently(&self, now: Instant) -> bool {
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) < MIN_REFRESH_INTERVAL)
    }
}

pub struct FirebaseTokenVerifier {
    http: reqwest::Client,
    settings: FirebaseSettings,
    keys: RwLock<KeyCache>,
}

impl FirebaseTokenVerifier {
    pub fn new(http: reqwest::Client, settings: FirebaseSettings) -> Self {
        Self {
            http,
            settings,
            keys: RwLock::new(KeyCache::default()),
        }
    }

    async fn fetch_keys(&self) -> PortResult<JwkSet> {
        let keys = self
            .http
            .get(GOOGLE_JWKS_URL)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| PortError::Unexpected(format!("Failed to fetch signing keys: {e}")))?
            .json::<JwkSet>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Invalid signing key set: {e}")))?;
        debug!(count = keys.keys.len(), "Fetched identity provider signing keys");
        Ok(keys)
    }

    /// The decoding key for `kid`. An unknown id refreshes the cached key set,
    /// unless it was fetched within [`MIN_REFRESH_INTERVAL`].
    async fn decoding_key(&self, kid: &str) -> PortResult<DecodingKey> {
        let unknown = || PortError::Unauthorized(format!("Unknown signing key '{kid}'"));

        if let Some(key) = self.keys.read().await.find(kid) {
            return key;
        }

        let mut cache = self.keys.write().await;
        // Another request may have refreshed while this one waited for the lock.
        if let Some(key) = cache.find(kid) {
            return key;
        }
        if cache.fetched_recently(Instant::now()) {
            debug!(%kid, "Unknown signing key, refresh skipped");
            return Err(unknown());
        }

        let fresh = self.fetch_keys().await?;
        cache.keys = Some(fresh);
        cache.fetched_at = Some(Instant::now());
        cache.find(kid).unwrap_or_else(|| Err(unknown()))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.settings.project_id.as_str()]);
        validation.set_issuer(&[self.settings.issuer()]);
        validation
    }
}

#[async_trait]
impl TokenVerificationService for FirebaseTokenVerifier {
    async fn verify_token(&self, token: &str) -> PortResult<Value> {
        let header = decode_header(token).map_err(|e| PortError::Unauthorized(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(PortError::Unauthorized(format!(
                "Unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| PortError::Unauthorized("Token has no key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;
        let claims = decode::<Value>(token, &key, &self.validation())
            .map_err(|e| PortError::Unauthorized(e.to_string()))?
            .claims;

        match claims.get("sub").and_then(Value::as_str) {
            Some(sub) if !sub.is_empty() => Ok(claims),
            _ => Err(PortError::Unauthorized("Token has no subject".to_string())),
        }
    }
}

//=========================================================================================
// Process-wide Instance
//=========================================================================================

static VERIFIER: OnceLock<Arc<FirebaseTokenVerifier>> = OnceLock::new();

/// The verifier shared by every invocation of this process, built on first
/// use. Two racing first calls may both build one; only the first is kept.
pub fn shared_verifier(config: &Config) -> Result<Arc<dyn TokenVerificationService>, ConfigError> {
    if let Some(verifier) = VERIFIER.get() {
        return Ok(verifier.clone() as Arc<dyn TokenVerificationService>);
    }

    let settings = FirebaseSettings::from_config(config)?;
    info!(project_id = %settings.project_id, "Initializing token verifier");
    let verifier = Arc::new(FirebaseTokenVerifier::new(reqwest::Client::new(), settings));
    Ok(VERIFIER.get_or_init(|| verifier).clone() as Arc<dyn TokenVerificationService>)
}
