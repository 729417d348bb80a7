//! Command-line flags. Every flag is optional and overrides its env variable.

use clap::Parser;

use super::schema::LogFormat;

/// sretarget - controllable HTTP target for probes, chaos and metrics tooling
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "sretarget-server", about, long_about = None)]
pub struct Cli {
    /// HTTP listen port [env: PORT]
    #[arg(long)]
    pub port: Option<u16>,

    /// UI message rendered on root page [env: UI_MESSAGE]
    #[arg(long)]
    pub message: Option<String>,

    /// UI accent color in hex format [env: UI_COLOR]
    #[arg(long)]
    pub color: Option<String>,

    /// Application version [env: APP_VERSION]
    #[arg(long = "version")]
    pub app_version: Option<String>,

    /// Git commit hash [env: APP_COMMIT]
    #[arg(long)]
    pub commit: Option<String>,

    /// Short git commit hash [env: APP_COMMIT_SHORT]
    #[arg(long)]
    pub commit_short: Option<String>,

    /// Build timestamp in RFC3339 format [env: APP_BUILD_DATE]
    #[arg(long)]
    pub build_date: Option<String>,

    /// Maximum random delay in milliseconds injected per request [env: RANDOM_DELAY_MAX]
    #[arg(long)]
    pub random_delay: Option<u64>,

    /// Probability [0-1] to inject random HTTP 500 errors [env: RANDOM_ERROR_RATE]
    #[arg(long)]
    pub random_error_rate: Option<f64>,

    /// Log encoding [env: LOG_FORMAT]
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}
