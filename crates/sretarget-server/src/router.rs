//! Axum router wiring.

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::handlers::{chaos, docs, info};
use crate::{app_state::AppState, middleware::Pipeline, ops};

/// Every route, without the pipeline. Tests extend this before applying it.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(info::index))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/readyz/enable", put(ops::ready_enable))
        .route("/readyz/disable", put(ops::ready_disable))
        .route("/livez", get(ops::livez))
        .route("/livez/enable", put(ops::live_enable))
        .route("/livez/disable", put(ops::live_disable))
        .route("/version", get(info::version))
        .route("/env", get(info::env))
        .route("/headers", get(info::headers))
        .route(
            "/echo",
            post(chaos::echo).layer(DefaultBodyLimit::max(chaos::ECHO_BODY_LIMIT)),
        )
        .route("/status/{code}", get(chaos::status))
        .route("/delay/{seconds}", get(chaos::delay))
        .route("/panic", get(chaos::panic))
        .route("/metrics", get(ops::metrics))
        .route("/openapi", get(docs::openapi))
        .route("/swagger", get(docs::swagger))
        .fallback(not_found)
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "status": "not found" }))).into_response()
}

/// Routes wrapped in the pipeline derived from `state`.
pub fn build_router(state: AppState) -> Router {
    Pipeline::for_state(&state).apply(routes(), state)
}
