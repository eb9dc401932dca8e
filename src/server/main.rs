//! Decoding server.
//!
//! Loads the boundary dataset and code table once at startup, then serves
//! `GET /convert` and `GET /health`. A missing boundary dataset does not stop
//! the server; it answers 503 until restarted with data in place.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geodecode::api::{router, AppState};
use geodecode::config::{Args, Settings};
use geodecode::Decoder;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::from_args(Args::parse())?;

    info!("Geodecode Server");
    info!("Boundaries: {}", settings.boundaries.display());
    info!("Codes: {}", settings.codes.display());

    let boundaries = settings.boundaries.clone();
    let codes = settings.codes.clone();
    let decoder =
        tokio::task::spawn_blocking(move || Decoder::open(&boundaries, Some(codes.as_path())))
            .await
            .context("Data loading task failed")?;

    if !decoder.is_ready() {
        warn!("Serving without boundary data; /convert will answer 503");
    }

    let app = router(Arc::new(AppState::new(decoder)));

    info!("Starting server on {}", settings.listen);

    let listener = tokio::net::TcpListener::bind(&settings.listen)
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
