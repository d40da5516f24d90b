//! Cronos charity agent
//!
//! A conversational donation assistant: a keyword-driven dialogue state
//! machine over a registry of verified charities, paying out through a
//! wallet bridge to an EVM-compatible Cronos node.

mod api;
mod config;
mod registry;
mod runtime;
mod state_machine;
mod wallet;

use api::{create_router, AppState};
use config::AppConfig;
use registry::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet::{JsonRpcWallet, LoggingWallet, WalletBridge};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cronos_charity_agent=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    let registry = Arc::new(Registry::seeded()?);
    tracing::info!(charities = registry.len(), "Charity registry loaded");

    tracing::info!(url = %config.rpc_url, "Using Cronos JSON-RPC node");
    let wallet: Arc<dyn WalletBridge> = Arc::new(LoggingWallet::new(Arc::new(
        JsonRpcWallet::new(config.rpc()),
    )));

    let state = AppState::new(registry, wallet);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Charity agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
