//! ot2net Server - Backend API and Edge Proxy
//!
//! - `ot2net serve`: backend API on `/api/*` (rate limited) with audited AI calls
//! - `ot2net edge`: browser-facing relay of `/api/*` to the backend origin
//! - `ot2net usage` / `ot2net config`: operator commands

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{info, warn};

mod api;
mod cli;
mod commands;
mod router;
mod server_utils;
mod state;

#[cfg(test)]
mod test_helpers;

use cli::{Cli, Commands};
use ot2net_core::modules::{config as core_config, logger};
use ot2net_core::proxy::EdgeProxy;
use ot2net_types::GatewayConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { command, log_level, config } = Cli::parse();

    if let Err(e) = logger::init_logging(&log_level) {
        eprintln!("{}", e);
    }

    let config_path = config.as_deref();
    let command = command.unwrap_or_else(|| Commands::Serve {
        port: std::env::var("PORT").ok().and_then(|p| p.parse().ok()),
    });
    match command {
        Commands::Serve { port } => run_backend(config_path, port).await,
        Commands::Edge { port, upstream } => run_edge(config_path, port, upstream).await,
        Commands::Usage { json, hours, recent } => {
            commands::show_usage(config_path, json, hours, recent).await
        },
        Commands::Config(cmd) => commands::handle_config_command(cmd, config_path),
    }
}

/// Load the config and apply `serve` flag overrides, re-validating the result.
fn backend_config(config_path: Option<&Path>, port: Option<u16>) -> Result<GatewayConfig> {
    let mut config = core_config::load_config(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }
    core_config::validate_config(&config)?;
    Ok(config)
}

fn edge_config(
    config_path: Option<&Path>,
    port: Option<u16>,
    upstream: Option<String>,
) -> Result<GatewayConfig> {
    let mut config = core_config::load_config(config_path)?;
    if let Some(port) = port {
        config.edge.port = port;
    }
    if let Some(upstream) = upstream {
        config.edge.upstream_origin = upstream;
    }
    core_config::validate_config(&config)?;
    Ok(config)
}

async fn run_backend(config_path: Option<&Path>, port: Option<u16>) -> Result<()> {
    let config = backend_config(config_path, port)?;
    if !config.anthropic.has_api_key() {
        warn!("ANTHROPIC_API_KEY is not set; AI calls will be rejected by the vendor");
    }

    let bind_address = config.get_bind_address().to_string();
    let port = config.port;
    info!(
        window_ms = config.rate_limit.window_ms,
        max_requests = config.rate_limit.max_requests,
        "Rate limiter configured"
    );

    let state = AppState::from_config(config)?;
    let app = router::build_backend_router(state);

    let listener = server_utils::create_listener(&bind_address, port)?;
    info!("Backend API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(server_utils::shutdown_signal())
        .await?;

    info!("Backend API stopped");
    Ok(())
}

async fn run_edge(
    config_path: Option<&Path>,
    port: Option<u16>,
    upstream: Option<String>,
) -> Result<()> {
    let config = edge_config(config_path, port, upstream)?;

    let proxy = EdgeProxy::from_config(&config.edge)?;
    let app = router::build_edge_app(proxy);

    let listener = server_utils::create_listener(config.get_bind_address(), config.edge.port)?;
    info!(
        upstream = %config.edge.upstream_origin,
        "Edge proxy listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(server_utils::shutdown_signal())
        .await?;

    info!("Edge proxy stopped");
    Ok(())
}
