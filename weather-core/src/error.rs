use serde_json::{Map, Value};
use thiserror::Error;

/// Status used when no explicit code is given.
pub const DEFAULT_STATUS: u16 = 400;

/// Category of a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input field.
    Validation,
    /// Token mismatch.
    Auth,
    /// The weather provider failed or answered with a non-success status.
    Upstream,
}

/// Error returned by every step of a weather request.
///
/// The HTTP boundary turns it into a response whose status is
/// [`ApiError::status_code`] and whose body is [`ApiError::to_body`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status_code: u16,
    payload: Option<Map<String, Value>>,
}

impl ApiError {
    /// Validation error with the default status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            status_code: DEFAULT_STATUS,
            payload: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Auth, status_code: 403, ..Self::new(message) }
    }

    /// Mirrors a non-success provider response: raw body as message, same status.
    pub fn upstream(status_code: u16, body: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Upstream, status_code, ..Self::new(body) }
    }

    /// Provider could not be reached or sent something unusable.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::upstream(502, message)
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.payload.as_ref()
    }

    /// JSON body `{...payload, "message": message}`.
    pub fn to_body(&self) -> Value {
        let mut body = self.payload.clone().unwrap_or_default();
        body.insert("message".to_string(), Value::String(self.message.clone()));
        Value::Object(body)
    }
}
