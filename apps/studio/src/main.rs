mod config;
mod errors;
mod export;
mod routes;
mod state;
mod synthesis;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::rasterizer::{Rasterizer, RemoteRasterizer, UnconfiguredRasterizer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Banner Studio API v{}", env!("CARGO_PKG_VERSION"));

    let rasterizer = build_rasterizer(&config)?;

    let state = AppState {
        config: config.clone(),
        rasterizer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Remote rasterizer when `RASTERIZER_URL` is set, otherwise one that always
/// fails so static export degrades to the HTML5 archive.
fn build_rasterizer(config: &Config) -> Result<Arc<dyn Rasterizer>> {
    match &config.rasterizer_url {
        Some(url) => {
            let timeout = Duration::from_secs(config.rasterizer_timeout_secs);
            let rasterizer = RemoteRasterizer::new(url.clone(), timeout)?;
            info!("Rasterizer client initialized ({url}, timeout {timeout:?})");
            Ok(Arc::new(rasterizer))
        }
        None => {
            warn!("RASTERIZER_URL not set; static export will return HTML5 archives");
            Ok(Arc::new(UnconfiguredRasterizer))
        }
    }
}
