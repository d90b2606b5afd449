//! services/functions/src/handlers/envelope.rs
//!
//! The request/response contract shared by every gateway-facing handler:
//! how an event body is decoded, how required fields are read, and how
//! success and error responses are shaped.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::ConfigError;
use crate::error::HandlerError;

//=========================================================================================
// Incoming Event
//=========================================================================================

/// The event the gateway hands to a function.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayEvent {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: Option<bool>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

impl GatewayEvent {
    /// Builds an event carrying a plain JSON body.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Looks a header up by its exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|headers| headers.get(name))
            .map(String::as_str)
    }

    /// The body as text, base64-decoded when the gateway flagged it.
    fn body_text(&self) -> Result<String, RequestError> {
        let raw = match self.body.as_deref() {
            Some(body) if !body.is_empty() => body,
            _ => return Ok("{}".to_string()),
        };

        if self.is_base64_encoded.unwrap_or(false) {
            let bytes = decode_base64(raw)?;
            Ok(String::from_utf8(bytes)?)
        } else {
            Ok(raw.to_string())
        }
    }
}

//=========================================================================================
// Request Decoding
//=========================================================================================

/// Decodes standard base64, ignoring ASCII whitespace such as the line breaks
/// MIME encoders insert.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact)
}

/// Why a request body could not be turned into the fields a handler needs.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(String),
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
}

impl RequestError {
    fn invalid(field: &str, expected: &'static str) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            expected,
        }
    }
}

/// The decoded JSON object of a request body.
#[derive(Debug, Clone, Default)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Decodes the event body. An absent body is an empty object.
    pub fn from_event(event: &GatewayEvent) -> Result<Self, RequestError> {
        let text = event.body_text()?;
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(RequestError::NotAnObject),
        }
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// A string that must be present. Empty strings are accepted.
    pub fn required_str(&self, key: &str) -> Result<&str, RequestError> {
        match self.0.get(key) {
            None => Err(RequestError::MissingField(key.to_string())),
            Some(value) => value
                .as_str()
                .ok_or_else(|| RequestError::invalid(key, "a string")),
        }
    }

    /// A string with a default for when the key is absent or null.
    pub fn optional_str<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, RequestError> {
        match self.present(key) {
            None => Ok(default),
            Some(value) => value
                .as_str()
                .ok_or_else(|| RequestError::invalid(key, "a string")),
        }
    }

    /// A string only if one with content was sent.
    pub fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn required_str_list(&self, key: &str) -> Result<Vec<String>, RequestError> {
        let items = self
            .0
            .get(key)
            .ok_or_else(|| RequestError::MissingField(key.to_string()))?
            .as_array()
            .ok_or_else(|| RequestError::invalid(key, "a list of strings"))?;

        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| RequestError::invalid(key, "a list of strings"))
            })
            .collect()
    }

    /// An integer with a default. Floats are truncated toward zero and
    /// numeric strings are parsed.
    pub fn optional_int(&self, key: &str, default: i64) -> Result<i64, RequestError> {
        let Some(value) = self.present(key) else {
            return Ok(default);
        };

        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| RequestError::invalid(key, "an integer"))
    }
}

//=========================================================================================
// Outgoing Response
//=========================================================================================

/// The `{statusCode, body}` object every function returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl ApiResponse {
    /// A 200 response with a JSON-encoded body.
    pub fn ok<T: Serialize>(body: &T) -> Result<Self, HandlerError> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(body)?,
        })
    }

    /// A response whose body is `{"error": message}`.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: json!({ "error": message.into() }).to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::error(401, message)
    }

    /// A 500 response for a setting the function was deployed without.
    pub fn misconfigured(error: &ConfigError) -> Self {
        Self::error(500, error.to_string())
    }

    /// Parses the body back into JSON. Handy for assertions.
    pub fn json_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl From<RequestError> for ApiResponse {
    fn from(error: RequestError) -> Self {
        Self::bad_request(format!("Invalid input: {error}"))
    }
}
