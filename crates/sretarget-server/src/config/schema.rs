//! Config schema: the settled `ServiceConfig` and its defaults.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

use sretarget_core::ChaosSettings;

/// Immutable service settings, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub listen_port: u16,
    pub ui_message: String,
    pub ui_color: String,
    pub version: String,
    pub commit: String,
    pub commit_short: String,
    pub build_date: String,
    pub max_injected_delay_ms: u64,
    pub injected_error_probability: f64,
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_port: default_port(),
            ui_message: default_ui_message(),
            ui_color: default_ui_color(),
            version: default_version(),
            commit: default_commit(),
            commit_short: default_commit(),
            build_date: String::new(),
            max_injected_delay_ms: 0,
            injected_error_probability: 0.0,
            log_format: LogFormat::Text,
        }
    }
}

impl ServiceConfig {
    /// Clamp the error probability into `[0, 1]`, warning when it moved.
    pub fn normalized(mut self) -> Self {
        let rate = self.injected_error_probability;
        let clamped = ChaosSettings::new(0, rate).error_rate;
        if clamped != rate {
            tracing::warn!(
                configured = rate,
                effective = clamped,
                "random error rate outside [0, 1], clamped"
            );
            self.injected_error_probability = clamped;
        }
        self
    }

    pub fn chaos_settings(&self) -> ChaosSettings {
        ChaosSettings::new(self.max_injected_delay_ms, self.injected_error_probability)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.listen_port))
    }
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

pub(crate) fn default_port() -> u16 {
    8080
}
pub(crate) fn default_ui_message() -> String {
    "Welcome to the SRE control plane".into()
}
pub(crate) fn default_ui_color() -> String {
    "#2E5CFF".into()
}
pub(crate) fn default_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}
pub(crate) fn default_commit() -> String {
    "unknown".into()
}
