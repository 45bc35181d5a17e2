//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use tokio::net::TcpListener;

use wicket::routing::Router;
use wicket::session::SessionStore;
use wicket::{HttpServer, ServerConfig, Shutdown};

/// A live server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    /// Handle into the running server's session store.
    pub sessions: SessionStore<Value>,
    shutdown: Arc<Shutdown>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Start a server for the given router and config; serves until
/// [`TestServer::stop`] or the test process exits.
pub async fn start_server(config: ServerConfig, router: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, router);
    let sessions = server.sessions();

    let shutdown = Arc::new(Shutdown::new());
    let sd = Arc::clone(&shutdown);
    tokio::spawn(async move {
        server.run(listener, &sd).await.unwrap();
    });

    TestServer {
        addr,
        sessions,
        shutdown,
    }
}
