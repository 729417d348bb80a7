//! Shared error type across sretarget crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed path parameter.
    BadRequest,
    /// Request body over the accepted ceiling.
    PayloadTooLarge,
    /// Failure deliberately produced by the chaos stage.
    ChaosInjected,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::ChaosInjected => "CHAOS_INJECTED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, SreError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum SreError {
    #[error("invalid status code: {0}")]
    InvalidStatusCode(String),
    #[error("invalid delay: {0}")]
    InvalidDelay(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: usize },
    #[error("random error injected")]
    ChaosInjected,
    #[error("internal: {0}")]
    Internal(String),
}

impl SreError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            SreError::InvalidStatusCode(_)
            | SreError::InvalidDelay(_)
            | SreError::BadRequest(_) => ClientCode::BadRequest,
            SreError::PayloadTooLarge { .. } => ClientCode::PayloadTooLarge,
            SreError::ChaosInjected => ClientCode::ChaosInjected,
            SreError::Internal(_) => ClientCode::Internal,
        }
    }
}
