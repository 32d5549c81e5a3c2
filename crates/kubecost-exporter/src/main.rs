//! Kubecost exporter
//!
//! - Config: `KUBECOST_EXPORTER_CONFIG` (yaml), `KUBECOST_URL`
//! - Endpoints: `/`, `/healthz`, telemetry path (default `/metrics`)
//! - Each scrape queries Kubecost live; nothing is cached between scrapes

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use kubecost_core::error::{KubecostError, Result};
use kubecost_exporter::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), error = %e, "kubecost-exporter failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load()?;
    let listen: SocketAddr = cfg
        .web
        .listen
        .parse()
        .map_err(|e| KubecostError::Config(format!("web.listen: {e}")))?;

    let state = app_state::AppState::new(cfg)?;
    let sources: Vec<&str> = state.sources().iter().map(|s| s.name()).collect();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        %listen,
        telemetry_path = %state.cfg().web.telemetry_path,
        ?sources,
        "kubecost-exporter starting"
    );

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| KubecostError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| KubecostError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
