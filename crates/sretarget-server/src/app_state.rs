//! Shared application state.
//!
//! Bundles the config, probe flags, chaos engine, metrics registry and page
//! templates behind one `Arc` so axum can clone it per request. Built once in
//! `main` (or per test) and handed to the router; nothing here is global.

use std::sync::Arc;

use sretarget_core::{ChaosEngine, ProbeState};

use crate::config::ServiceConfig;
use crate::error::ServerError;
use crate::obs::ServiceMetrics;
use crate::pages::Pages;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    probes: ProbeState,
    chaos: ChaosEngine,
    metrics: Arc<ServiceMetrics>,
    pages: Pages,
}

impl AppState {
    /// Build application state with an entropy-seeded chaos engine.
    pub fn new(cfg: ServiceConfig) -> Result<Self, ServerError> {
        let chaos = ChaosEngine::new(cfg.chaos_settings());
        Self::with_chaos(cfg, chaos)
    }

    /// Build application state around a caller-provided chaos engine.
    pub fn with_chaos(cfg: ServiceConfig, chaos: ChaosEngine) -> Result<Self, ServerError> {
        let pages = Pages::new()?;
        let metrics = Arc::new(ServiceMetrics::new(&cfg.version, &cfg.commit));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                probes: ProbeState::new(),
                chaos,
                metrics,
                pages,
            }),
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn probes(&self) -> &ProbeState {
        &self.inner.probes
    }

    pub fn chaos(&self) -> &ChaosEngine {
        &self.inner.chaos
    }

    pub fn metrics(&self) -> &Arc<ServiceMetrics> {
        &self.inner.metrics
    }

    pub fn pages(&self) -> &Pages {
        &self.inner.pages
    }
}
