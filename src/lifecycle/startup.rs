//! Startup orchestration.
//!
//! Subsystems start in dependency order: store, metrics, listener. The
//! listener binds last so traffic only arrives once the store is open.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::TrackerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::store::{DocumentStore, IssueStore};

/// Run the service until a shutdown signal arrives.
pub async fn run(config: TrackerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(DocumentStore::open(&config.store)?);

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        store = config.store.data_path.as_deref().unwrap_or("memory"),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(&config, store.clone());
    server.run(listener, server_shutdown).await?;

    store.close()?;
    Ok(())
}
