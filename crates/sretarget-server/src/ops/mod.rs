//! Operational HTTP endpoints.
//!
//! - `/healthz` : always ok
//! - `/readyz`  : readiness flag (503 when disabled), toggled via `PUT /readyz/{enable,disable}`
//! - `/livez`   : liveness flag (503 when disabled), toggled via `PUT /livez/{enable,disable}`
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app_state::AppState;

fn status_json(code: StatusCode, status: &str) -> Response {
    (code, Json(json!({ "status": status }))).into_response()
}

pub async fn healthz() -> Response {
    status_json(StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> Response {
    if state.probes().is_ready() {
        status_json(StatusCode::OK, "ready")
    } else {
        status_json(StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

pub async fn ready_enable(State(state): State<AppState>) -> Response {
    state.probes().set_ready(true);
    tracing::info!("readiness enabled");
    status_json(StatusCode::OK, "ready")
}

pub async fn ready_disable(State(state): State<AppState>) -> Response {
    state.probes().set_ready(false);
    tracing::info!("readiness disabled");
    status_json(StatusCode::OK, "paused")
}

pub async fn livez(State(state): State<AppState>) -> Response {
    if state.probes().is_live() {
        status_json(StatusCode::OK, "live")
    } else {
        status_json(StatusCode::SERVICE_UNAVAILABLE, "not live")
    }
}

pub async fn live_enable(State(state): State<AppState>) -> Response {
    state.probes().set_live(true);
    tracing::info!("liveness enabled");
    status_json(StatusCode::OK, "live")
}

pub async fn live_disable(State(state): State<AppState>) -> Response {
    state.probes().set_live(false);
    tracing::warn!("liveness disabled");
    status_json(StatusCode::OK, "paused")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render(state.probes());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
