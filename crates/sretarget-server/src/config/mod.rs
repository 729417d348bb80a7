//! Service configuration: command-line flag > environment variable > default.

pub mod cli;
pub mod schema;

use std::fmt::Display;
use std::str::FromStr;

pub use cli::Cli;
pub use schema::{LogFormat, ServiceConfig};

/// Build the config from parsed flags and the process environment.
pub fn load(cli: &Cli) -> ServiceConfig {
    load_with(cli, |key| std::env::var(key).ok())
}

/// Same as [`load`] with an injectable environment lookup.
pub fn load_with<F>(cli: &Cli, lookup: F) -> ServiceConfig
where
    F: Fn(&str) -> Option<String>,
{
    let env = from_env(&lookup);
    let cli = cli.clone();

    ServiceConfig {
        listen_port: cli.port.unwrap_or(env.listen_port),
        ui_message: cli.message.unwrap_or(env.ui_message),
        ui_color: cli.color.unwrap_or(env.ui_color),
        version: cli.app_version.unwrap_or(env.version),
        commit: cli.commit.unwrap_or(env.commit),
        commit_short: cli.commit_short.unwrap_or(env.commit_short),
        build_date: cli.build_date.unwrap_or(env.build_date),
        max_injected_delay_ms: cli.random_delay.unwrap_or(env.max_injected_delay_ms),
        injected_error_probability: cli
            .random_error_rate
            .unwrap_or(env.injected_error_probability),
        log_format: cli.log_format.unwrap_or(env.log_format),
    }
    .normalized()
}

fn from_env<F>(lookup: &F) -> ServiceConfig
where
    F: Fn(&str) -> Option<String>,
{
    let d = ServiceConfig::default();
    ServiceConfig {
        listen_port: env_parse(lookup, "PORT", d.listen_port),
        ui_message: env_string(lookup, "UI_MESSAGE", d.ui_message),
        ui_color: env_string(lookup, "UI_COLOR", d.ui_color),
        version: env_string(lookup, "APP_VERSION", d.version),
        commit: env_string(lookup, "APP_COMMIT", d.commit),
        commit_short: env_string(lookup, "APP_COMMIT_SHORT", d.commit_short),
        build_date: env_string(lookup, "APP_BUILD_DATE", d.build_date),
        max_injected_delay_ms: env_parse(lookup, "RANDOM_DELAY_MAX", d.max_injected_delay_ms),
        injected_error_probability: env_parse(
            lookup,
            "RANDOM_ERROR_RATE",
            d.injected_error_probability,
        ),
        log_format: env_parse(lookup, "LOG_FORMAT", d.log_format),
    }
}

/// Empty values count as unset.
fn env_string<F>(lookup: &F, key: &str, fallback: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

/// Unparsable values fall back to the default.
fn env_parse<F, T>(lookup: &F, key: &str, fallback: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return fallback;
    };
    match raw.trim().parse() {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid env value");
            fallback
        }
    }
}

/// Log encoding, resolvable before logging (and the rest of the config) is set up.
pub fn log_format(cli: &Cli) -> LogFormat {
    cli.log_format.unwrap_or_else(|| {
        std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    })
}
