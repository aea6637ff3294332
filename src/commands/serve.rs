//! HTTP server command implementation.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use agentgate::agent::AgentRegistry;
use agentgate::config::Config;
use agentgate::dispatch::Dispatcher;
use agentgate::llm::ProviderRegistry;
use agentgate::market::MarketClient;
use agentgate::server::{self, AppState};
use agentgate::store::StatusCheckStore;
use agentgate::store::file::FileStatusStore;

pub async fn run(
    config_path: &str,
    host_override: Option<IpAddr>,
    port_override: Option<u16>,
) -> Result<()> {
    let mut config = Config::load(config_path)
        .await
        .with_context(|| format!("failed to load config from {config_path}"))?;

    // CLI overrides config
    if let Some(host) = host_override {
        config.server.host = host.to_string();
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }

    // Both store settings are required to start.
    let location = config
        .store
        .resolve()
        .context("data store is not configured")?;
    let status_store = FileStatusStore::at(&location);
    status_store
        .ensure_dir()
        .await
        .context("failed to prepare data store")?;
    info!(database = %location.database, path = %location.database_dir().display(), "Status store ready");

    let providers = ProviderRegistry::from_env();
    let registry = AgentRegistry::with_builtins(config.agents.clone(), providers);
    info!(agent_types = ?registry.registered_types(), "Registered agent types");

    let market = MarketClient::new(&config.market).context("failed to build market client")?;

    let state = AppState {
        dispatcher: Dispatcher::new(registry),
        market,
        status_store: Some(Arc::new(status_store) as Arc<dyn StatusCheckStore>),
    };

    let app = server::build_app(state, config.server.request_timeout_seconds);

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid host '{}'", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, "Starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
