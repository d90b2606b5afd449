//! services/functions/src/error.rs
//!
//! Defines the error type a handler returns when an invocation cannot be
//! answered with a response. The Lambda runtime reports these as failed
//! invocations.

use crate::config::ConfigError;
use study_aid_core::ports::PortError;

/// The primary error type for the `functions` service.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a failure to encode a response body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
