//! spind - asynchronous music playback daemon.
//!
//! Wires the playback session, the command catalogue, and both transport
//! adapters together, then runs until killed.

use spind::commands;
use spind::config::Config;
use spind::dispatch::Dispatcher;
use spind::gateway::Gateway;
use spind::http::{self, Bridge};
use spind::metrics;
use spind::session::{Library, Session};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "spind.toml".to_string());

    let config = Config::load_or_default(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.name,
        http = %config.http.address,
        gateway = %config.gateway.address,
        "Starting spind"
    );

    // Load the track library
    let library = match &config.library.path {
        Some(path) => Library::load(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to load library");
            e
        })?,
        None => {
            warn!("No library configured; starting with an empty one");
            Library::default()
        }
    };
    let track_count: usize = library.playlists.iter().map(|pl| pl.tracks.len()).sum();
    info!(
        playlists = library.playlists.len(),
        tracks = track_count,
        "Library loaded"
    );

    // Prometheus metrics are optional.
    // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
    let metrics_port = config.server.metrics_port.unwrap_or(9090);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        tokio::spawn(async move {
            http::run_metrics_server(metrics_port).await;
        });
        info!(port = metrics_port, "Prometheus HTTP server started");
    }

    // Session, catalogue, dispatcher: one of each for the whole process.
    let session = Arc::new(Session::new(library));
    let dispatcher = Arc::new(Dispatcher::new(commands::catalogue(), session));

    // Start the HTTP bridge
    let bridge = Bridge::bind(config.http.address, Arc::clone(&dispatcher)).await?;
    tokio::spawn(async move {
        if let Err(e) = bridge.run().await {
            error!(error = %e, "HTTP bridge terminated");
        }
    });

    // Start the line gateway and serve until killed
    let gateway = Gateway::bind(config.gateway.address, dispatcher).await?;
    gateway.run().await?;

    Ok(())
}
