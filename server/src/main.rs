//! Praxis server binary.
//!
//! Startup order: logging, configuration, backend selection (in-process
//! engine or remote forwarding), sandbox-runtime probe and image pulls, then
//! serve until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use praxis_executor::Engine;
use praxis_server::client::RemoteExecutor;
use praxis_server::config::ServerConfig;
use praxis_server::router;
use praxis_server::state::{AppState, Backend};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServerConfig::from_env();
    if config.uses_default_api_key() {
        tracing::warn!("EXECUTION_API_KEY not set; using the development default");
    }
    tracing::info!(origins = ?config.allowed_origins, "allowed origins");

    let backend = match &config.remote_url {
        Some(url) => {
            tracing::info!(%url, "forwarding execution to remote service");
            Backend::Remote(Arc::new(RemoteExecutor::new(
                url.clone(),
                config.api_key.clone(),
            )))
        }
        None => {
            let engine = Engine::new();
            if engine.runtime_available().await {
                tracing::info!("sandbox runtime is reachable");
                engine.pull_images().await;
            } else {
                tracing::warn!("sandbox runtime is NOT reachable; execution will fail");
            }
            Backend::Local(Arc::new(engine))
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, backend);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
