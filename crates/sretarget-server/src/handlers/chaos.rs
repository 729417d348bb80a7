//! Fault endpoints: forced status, handler-level delay, body echo, termination.

use std::time::Duration;

use axum::{
    extract::{rejection::BytesRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;

use sretarget_core::{Result, SreError, TERMINATION_EXIT_CODE};

use crate::app_state::AppState;
use crate::error::HttpError;

/// Echo body ceiling (1 MiB).
pub const ECHO_BODY_LIMIT: usize = 1 << 20;

/// Time the `/panic` response gets to flush before the process exits.
pub const TERMINATION_GRACE: Duration = Duration::from_millis(100);

/// `GET /status/{code}`: answer with the requested status.
pub async fn status(Path(code): Path<String>) -> std::result::Result<Response, HttpError> {
    let status = parse_status(&code)?;
    Ok((status, format!("status forced to {}\n", status.as_u16())).into_response())
}

/// Integer in `[100, 599]`.
pub fn parse_status(raw: &str) -> Result<StatusCode> {
    raw.parse::<u16>()
        .ok()
        .filter(|c| (100..=599).contains(c))
        .and_then(|c| StatusCode::from_u16(c).ok())
        .ok_or_else(|| SreError::InvalidStatusCode(raw.to_owned()))
}

/// `GET /delay/{seconds}`: sleep, then 200. Stacks on top of any chaos delay.
pub async fn delay(Path(seconds): Path<String>) -> std::result::Result<Response, HttpError> {
    let wait = parse_delay(&seconds)?;
    tokio::time::sleep(wait).await;
    Ok(Json(json!({ "delay": seconds })).into_response())
}

/// Finite, non-negative seconds.
pub fn parse_delay(raw: &str) -> Result<Duration> {
    raw.parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| SreError::InvalidDelay(raw.to_owned()))
}

/// `POST /echo`: return the body byte-for-byte with its content type.
pub async fn echo(
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> std::result::Result<Response, HttpError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            SreError::PayloadTooLarge {
                limit: ECHO_BODY_LIMIT,
            }
        } else {
            SreError::BadRequest(rejection.body_text())
        }
    })?;

    if body.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let mut resp = (StatusCode::OK, body).into_response();
    match headers.get(header::CONTENT_TYPE) {
        Some(ct) => {
            resp.headers_mut().insert(header::CONTENT_TYPE, ct.clone());
        }
        None => {
            resp.headers_mut().remove(header::CONTENT_TYPE);
        }
    }
    Ok(resp)
}

/// `GET /panic`: acknowledge, then exit the process shortly after.
pub async fn panic(State(state): State<AppState>) -> Response {
    tracing::warn!(
        code = TERMINATION_EXIT_CODE,
        grace_ms = TERMINATION_GRACE.as_millis() as u64,
        "/panic invoked, scheduling process termination"
    );
    state.chaos().trigger_delayed_termination(TERMINATION_GRACE);
    Json(json!({ "status": "terminating" })).into_response()
}
