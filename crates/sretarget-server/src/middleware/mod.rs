//! Request pipeline.
//!
//! Stages, outermost first:
//! 1. `Recover`         - panic isolation, converts to 500
//! 2. `RequestIdentity` - request id, client ip, tracing span
//! 3. `Metrics`         - in-flight gauge, request counter, latency histogram
//! 4. `AccessLog`       - one structured event per request
//! 5. `Chaos`           - injected delay / 500 (present only when configured)
//!
//! The stage list is computed once from the chaos settings and folded into the
//! router; a disabled chaos stage is simply not in the chain.

pub mod access_log;
pub mod chaos;
pub mod metrics;
pub mod recover;
pub mod request_id;

use axum::{middleware::from_fn, middleware::from_fn_with_state, Router};
use tower_http::catch_panic::CatchPanicLayer;

use sretarget_core::ChaosSettings;

use crate::app_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Recover,
    RequestIdentity,
    Metrics,
    AccessLog,
    Chaos,
}

/// Ordered stage list, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn from_settings(chaos: &ChaosSettings) -> Self {
        let mut stages = vec![
            Stage::Recover,
            Stage::RequestIdentity,
            Stage::Metrics,
            Stage::AccessLog,
        ];
        if chaos.is_enabled() {
            stages.push(Stage::Chaos);
        }
        Self { stages }
    }

    /// Pipeline matching the chaos engine the state actually carries.
    pub fn for_state(state: &AppState) -> Self {
        Self::from_settings(&state.chaos().settings())
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Wrap `routes` in every stage and bind the state.
    pub fn apply(&self, routes: Router<AppState>, state: AppState) -> Router {
        // Each `layer` call wraps everything added before it: innermost goes first.
        let router = self
            .stages
            .iter()
            .rev()
            .fold(routes, |router, stage| match stage {
                Stage::Recover => router.layer(CatchPanicLayer::custom(recover::panic_response)),
                Stage::RequestIdentity => router.layer(from_fn(request_id::tag)),
                Stage::Metrics => {
                    router.layer(from_fn_with_state(state.clone(), metrics::capture))
                }
                Stage::AccessLog => router.layer(from_fn(access_log::log)),
                Stage::Chaos => router.layer(from_fn_with_state(state.clone(), chaos::inject)),
            });

        router.with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaos_stage_absent_when_disabled() {
        let p = Pipeline::from_settings(&ChaosSettings::disabled());
        assert_eq!(
            p.stages(),
            &[
                Stage::Recover,
                Stage::RequestIdentity,
                Stage::Metrics,
                Stage::AccessLog
            ]
        );
    }

    #[test]
    fn chaos_stage_is_innermost_when_enabled() {
        for settings in [ChaosSettings::new(10, 0.0), ChaosSettings::new(0, 0.1)] {
            let p = Pipeline::from_settings(&settings);
            assert_eq!(p.stages().len(), 5);
            assert_eq!(p.stages()[0], Stage::Recover);
            assert_eq!(p.stages().last(), Some(&Stage::Chaos));
        }
    }
}
