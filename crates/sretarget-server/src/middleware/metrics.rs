//! Metrics capture stage.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unknown";

/// Matched route pattern (`/status/{code}`), never the raw path.
pub fn route_pattern(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned())
}

pub async fn capture(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = route_pattern(&req);
    let observation = state.metrics().begin(req.method().as_str(), &route);

    let resp = next.run(req).await;
    observation.finish(resp.status().as_u16());
    resp
}
