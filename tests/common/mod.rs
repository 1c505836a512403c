//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use issue_tracker::config::TrackerConfig;
use issue_tracker::http::HttpServer;
use issue_tracker::lifecycle::Shutdown;
use issue_tracker::store::{DocumentStore, IssueStore};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A tracker running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
    /// Start a server over a fresh in-memory store.
    pub async fn start() -> Self {
        Self::with_store(Arc::new(DocumentStore::in_memory())).await
    }

    /// Start a server over the given store.
    pub async fn with_store(store: Arc<dyn IssueStore>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = HttpServer::new(&TrackerConfig::default(), store);
        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        let handle = tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self { addr, shutdown, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn issues_url(&self, project: &str) -> String {
        format!("{}/api/issues/{}", self.base_url(), project)
    }

    /// Trigger graceful shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// A client that bypasses any system proxy.
#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
