//! # Reclaimarr Server binary
//!
//! Wires the pieces together: environment config, the housekeeping
//! context, the background scheduler, and the axum router.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use reclaimarr_config::EnvConfig;
use reclaimarr_core::HousekeepingContext;
use reclaimarr_server::{AppState, logging, routes, scheduler};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "reclaimarr-server")]
#[command(about = "Media-library housekeeping dashboard with retention rules and archive actions")]
struct Cli {
    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Persistent data directory for settings and logs (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut env = EnvConfig::from_env();
    if let Some(host) = cli.host {
        env.server_host = host;
    }
    if let Some(port) = cli.port {
        env.server_port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        env.data_dir = data_dir;
    }

    env.ensure_data_dir()
        .with_context(|| format!("failed to create data directory {}", env.data_dir.display()))?;
    let _log_guard = logging::init(&env.data_dir);
    info!("Application starting up...");

    let ctx = Arc::new(HousekeepingContext::from_env(&env));

    // Resolved settings drive the sync cadence; everything else is read
    // per pass so edits apply without a restart.
    let settings = ctx.settings.load();
    scheduler::spawn_background_jobs(Arc::clone(&ctx), settings.sync_interval_minutes);

    let state = AppState::new(ctx, env.data_dir.clone());
    let app = routes::create_api_router(state)
        .layer(build_cors_layer(&env.cors_allowed_origins))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", env.server_host, env.server_port)
        .parse()
        .with_context(|| {
            format!("invalid bind address {}:{}", env.server_host, env.server_port)
        })?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
