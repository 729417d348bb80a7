//! Access log stage: exactly one event per request, emitted on exit.

use std::time::Instant;

use axum::{extract::Request, http::Method, middleware::Next, response::Response};

use super::chaos::ChaosInjected;

pub async fn log(req: Request, next: Next) -> Response {
    let mut entry = AccessEntry {
        method: req.method().clone(),
        path: req.uri().path().to_owned(),
        start: Instant::now(),
        outcome: None,
    };

    let resp = next.run(req).await;
    entry.outcome = Some((
        resp.status().as_u16(),
        resp.extensions().get::<ChaosInjected>().is_some(),
    ));
    resp
}

struct AccessEntry {
    method: Method,
    path: String,
    start: Instant,
    /// (status, chaos_injected); unset when the request never produced a response.
    outcome: Option<(u16, bool)>,
}

impl Drop for AccessEntry {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_secs_f64() * 1_000.0;
        let method = self.method.as_str();
        let path = self.path.as_str();

        match self.outcome {
            Some((status, true)) => tracing::warn!(
                method,
                path,
                status,
                duration_ms,
                chaos_injected = true,
                "request served"
            ),
            Some((status, false)) => tracing::info!(
                method,
                path,
                status,
                duration_ms,
                chaos_injected = false,
                "request served"
            ),
            None if std::thread::panicking() => tracing::error!(
                method,
                path,
                status = 500_u16,
                duration_ms,
                "request panicked"
            ),
            None => tracing::info!(method, path, duration_ms, "request cancelled"),
        }
    }
}
