//! Shared helpers for router-level tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{Method, Request, Response},
    Router,
};
use tower::ServiceExt;

use sretarget_server::config::ServiceConfig;

pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_port: 0,
        ui_message: "Test Message".into(),
        ui_color: "#ffffff".into(),
        version: "vtest".into(),
        commit: "deadbeef".into(),
        commit_short: "deadbee".into(),
        build_date: "2024-01-01T00:00:00Z".into(),
        max_injected_delay_ms: 0,
        injected_error_probability: 0.0,
        ..ServiceConfig::default()
    }
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri)).await
}

pub async fn put(app: &Router, uri: &str) -> Response<Body> {
    send(app, request(Method::PUT, uri)).await
}

pub async fn body_bytes(resp: Response<Body>) -> Bytes {
    to_bytes(resp.into_body(), usize::MAX).await.unwrap()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("json body")
}

pub async fn body_text(resp: Response<Body>) -> String {
    String::from_utf8(body_bytes(resp).await.to_vec()).unwrap()
}
