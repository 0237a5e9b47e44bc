//! Model provider errors

use thiserror::Error;

/// A failed model request, classified by cause
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Timeout, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }
}

/// What went wrong talking to the model provider.
///
/// `Auth` is the only kind whose message reaches the customer; the runtime
/// turns `Timeout` into a 504 and everything else into a generic 502.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection refused, reset or DNS failure
    Network,
    /// No response within the request deadline
    Timeout,
    /// 429 from the provider
    RateLimit,
    /// 5xx from the provider
    ServerError,
    /// 401/403, or no API key configured
    Auth,
    /// 400; usually a malformed transcript or tool schema
    InvalidRequest,
    /// Anything the response parser could not classify
    Unknown,
}
