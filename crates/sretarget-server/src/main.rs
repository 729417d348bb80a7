//! sretarget-server
//!
//! - Config: flags > env > defaults
//! - Structured logging (text or JSON) via tracing-subscriber
//! - Graceful shutdown on SIGINT/SIGTERM, bounded drain, non-zero exit on failure

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing_subscriber::{fmt, EnvFilter};

use sretarget_server::{
    app_state::AppState,
    config::{self, Cli, LogFormat, ServiceConfig},
    error::ServerError,
    router,
};

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(config::log_format(&cli)) {
        eprintln!("sretarget-server: {e}");
        return ExitCode::FAILURE;
    }

    let cfg = config::load(&cli);
    match run(cfg).await {
        Ok(()) => {
            tracing::info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "fatal server error");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(format: LogFormat) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);
    let res = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    res.map_err(|e| ServerError::Logging(e.to_string()))
}

async fn run(cfg: ServiceConfig) -> Result<(), ServerError> {
    let listen = cfg.listen_addr();
    let chaos = cfg.chaos_settings();

    let state = AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(
        %listen,
        random_delay_max_ms = chaos.max_delay_ms,
        random_error_rate = chaos.error_rate,
        "sretarget-server starting"
    );
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|source| ServerError::Bind {
            addr: listen,
            source,
        })?;

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let server = async move { serve.await };

    // Starts counting only once a signal arrived.
    let drain_deadline = async move {
        if signalled_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(SHUTDOWN_GRACE).await;
    };

    tokio::select! {
        res = server => res.map_err(ServerError::Serve),
        () = drain_deadline => Err(ServerError::ShutdownTimeout(SHUTDOWN_GRACE)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "signal received, draining in-flight requests");
}
