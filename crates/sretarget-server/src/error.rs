//! HTTP mapping of core errors, plus fatal server errors.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use sretarget_core::error::{ClientCode, SreError};

/// Marker header on responses produced by the chaos stage.
pub const CHAOS_HEADER: HeaderName = HeaderName::from_static("x-chaos-injected");

/// Core error rendered as a JSON HTTP response.
#[derive(Debug)]
pub struct HttpError(pub SreError);

impl From<SreError> for HttpError {
    fn from(e: SreError) -> Self {
        Self(e)
    }
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self.0.client_code() {
            ClientCode::BadRequest => StatusCode::BAD_REQUEST,
            ClientCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ClientCode::ChaosInjected | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let body = Json(json!({
            "error": code.as_str(),
            "message": self.0.to_string(),
        }));
        let mut resp = (self.status(), body).into_response();
        if code == ClientCode::ChaosInjected {
            resp.headers_mut()
                .insert(CHAOS_HEADER, HeaderValue::from_static("true"));
        }
        resp
    }
}

/// Fatal startup / shutdown failures. The binary exits non-zero on any of these.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
    #[error("graceful shutdown exceeded {0:?}")]
    ShutdownTimeout(Duration),
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            HttpError(SreError::InvalidDelay("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HttpError(SreError::PayloadTooLarge { limit: 1 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            HttpError(SreError::ChaosInjected).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn chaos_responses_carry_marker_header() {
        let resp = HttpError(SreError::ChaosInjected).into_response();
        assert_eq!(resp.headers().get(CHAOS_HEADER).unwrap(), "true");

        let resp = HttpError(SreError::Internal("x".into())).into_response();
        assert!(resp.headers().get(CHAOS_HEADER).is_none());
    }
}
