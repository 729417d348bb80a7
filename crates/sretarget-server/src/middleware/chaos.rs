//! Chaos stage: optional sleep, then optional short-circuit with a 500.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use sretarget_core::SreError;

use crate::app_state::AppState;
use crate::error::HttpError;

/// Response extension set on chaos-generated responses; outer stages read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaosInjected;

pub async fn inject(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let decision = state.chaos().decide();

    if let Some(delay) = decision.delay {
        state.metrics().record_chaos_delay(delay);
        tokio::time::sleep(delay).await;
    }

    if decision.inject_error {
        state.metrics().record_chaos_error();
        tracing::warn!(
            chaos_injected = true,
            path = %req.uri().path(),
            "random error injected"
        );
        let mut resp = HttpError(SreError::ChaosInjected).into_response();
        resp.extensions_mut().insert(ChaosInjected);
        return resp;
    }

    next.run(req).await
}
