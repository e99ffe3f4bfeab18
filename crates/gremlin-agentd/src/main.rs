use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use gremlin_api::{ApiState, HttpApi};
use gremlin_load::{CancellationToken, LoadCoordinator};
use gremlin_observe::init_logger;
use gremlin_pg::{ConnectionManager, ConnectionStore};
use gremlin_prometheus::PrometheusMetrics;
use gremlin_send::HttpSender;

mod config;
mod metrics;

use config::AgentConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AgentConfig::parse();

    // 1) Logger
    init_logger(&cfg.logger())?;
    gremlin_about::init_uptime();
    info!(target: "gremlin.agentd", version = env!("CARGO_PKG_VERSION"), "logger initialized");

    // 2) Metrics + coordinator
    let prometheus = PrometheusMetrics::new()?;
    let coordinator = LoadCoordinator::with_metrics(Arc::new(prometheus.clone()));

    // 3) SQL proxy
    let store = Arc::new(ConnectionStore::new());
    let postgres = ConnectionManager::new(Arc::clone(&store))
        .with_connect_timeout(cfg.pg_connect_timeout)
        .with_ping_timeout(cfg.pg_ping_timeout);

    // 4) Router
    let shutdown = CancellationToken::new();
    let state = Arc::new(ApiState::new(
        coordinator,
        Arc::new(postgres),
        HttpSender::new(),
        shutdown.clone(),
    ));
    let app = HttpApi::new(state)
        .router()
        .merge(metrics::router(prometheus));

    // 5) Serve until SIGINT/SIGTERM
    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(target: "gremlin.agentd", %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("server error")?;

    store.clear();
    info!(target: "gremlin.agentd", "stopped");
    Ok(())
}

/// Resolves on the first termination signal and cancels every in-flight load.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(target: "gremlin.agentd", error = %e, "SIGINT handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(target: "gremlin.agentd", error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(target: "gremlin.agentd", "received SIGINT, shutting down..."),
        _ = terminate => info!(target: "gremlin.agentd", "received SIGTERM, shutting down..."),
    }
    shutdown.cancel();
}
