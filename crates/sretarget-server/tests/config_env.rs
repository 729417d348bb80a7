#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;

use clap::Parser;
use sretarget_server::config::{self, Cli, LogFormat, ServiceConfig};

fn load(args: &[&str], env: &[(&str, &str)]) -> ServiceConfig {
    let mut argv = vec!["sretarget-server"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("flags parse");
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    config::load_with(&cli, |key| env.get(key).cloned())
}

#[test]
fn defaults_without_env_or_flags() {
    let cfg = load(&[], &[]);
    assert_eq!(cfg.listen_port, 8080);
    assert_eq!(cfg.ui_message, "Welcome to the SRE control plane");
    assert_eq!(cfg.ui_color, "#2E5CFF");
    assert_eq!(cfg.max_injected_delay_ms, 0);
    assert_eq!(cfg.injected_error_probability, 0.0);
    assert_eq!(cfg.log_format, LogFormat::Text);
    assert!(!cfg.chaos_settings().is_enabled());
}

#[test]
fn env_overrides_defaults() {
    let cfg = load(
        &[],
        &[
            ("PORT", "9090"),
            ("UI_MESSAGE", "hello"),
            ("APP_COMMIT_SHORT", "abc1234"),
            ("RANDOM_DELAY_MAX", "250"),
            ("RANDOM_ERROR_RATE", "0.1"),
            ("LOG_FORMAT", "json"),
        ],
    );
    assert_eq!(cfg.listen_port, 9090);
    assert_eq!(cfg.ui_message, "hello");
    assert_eq!(cfg.commit_short, "abc1234");
    assert_eq!(cfg.max_injected_delay_ms, 250);
    assert_eq!(cfg.injected_error_probability, 0.1);
    assert_eq!(cfg.log_format, LogFormat::Json);
    assert!(cfg.chaos_settings().is_enabled());
}

#[test]
fn flags_override_env() {
    let cfg = load(
        &[
            "--port",
            "7000",
            "--version",
            "v9",
            "--commit-short",
            "fff0000",
            "--random-delay",
            "5",
            "--random-error-rate",
            "0.5",
        ],
        &[
            ("PORT", "9090"),
            ("APP_VERSION", "v1"),
            ("APP_COMMIT_SHORT", "abc1234"),
            ("RANDOM_DELAY_MAX", "250"),
        ],
    );
    assert_eq!(cfg.listen_port, 7000);
    assert_eq!(cfg.version, "v9");
    assert_eq!(cfg.commit_short, "fff0000");
    assert_eq!(cfg.max_injected_delay_ms, 5);
    assert_eq!(cfg.injected_error_probability, 0.5);
}

#[test]
fn empty_env_values_count_as_unset() {
    let cfg = load(&[], &[("UI_COLOR", ""), ("PORT", "")]);
    assert_eq!(cfg.ui_color, "#2E5CFF");
    assert_eq!(cfg.listen_port, 8080);
}

#[test]
fn invalid_env_numbers_fall_back() {
    let cfg = load(
        &[],
        &[
            ("PORT", "eighty"),
            ("RANDOM_DELAY_MAX", "-5"),
            ("RANDOM_ERROR_RATE", "lots"),
        ],
    );
    assert_eq!(cfg.listen_port, 8080);
    assert_eq!(cfg.max_injected_delay_ms, 0);
    assert_eq!(cfg.injected_error_probability, 0.0);
}

#[test]
fn error_rate_is_clamped() {
    assert_eq!(
        load(&[], &[("RANDOM_ERROR_RATE", "1.5")]).injected_error_probability,
        1.0
    );
    assert_eq!(
        load(&[], &[("RANDOM_ERROR_RATE", "-0.3")]).injected_error_probability,
        0.0
    );
}

#[test]
fn listen_addr_uses_port() {
    let cfg = load(&["--port", "8181"], &[]);
    assert_eq!(cfg.listen_addr().port(), 8181);
    assert!(cfg.listen_addr().ip().is_unspecified());
}

#[test]
fn bad_flag_is_rejected() {
    assert!(Cli::try_parse_from(["sretarget-server", "--port", "99999"]).is_err());
    assert!(Cli::try_parse_from(["sretarget-server", "--log-format", "xml"]).is_err());
}
