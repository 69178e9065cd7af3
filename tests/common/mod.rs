//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use treeroute::{HttpServer, NullObserver, RouteTable, Shutdown};

/// Creates an empty file (and its parent directories) under a scratch
/// routes tree.
#[allow(dead_code)]
pub fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

/// Serves a table on an ephemeral port.
///
/// Returns the bound address, the shutdown handle, and the serving task.
/// Dropping the shutdown handle also winds the server down.
#[allow(dead_code)]
pub async fn spawn_server(
    table: RouteTable,
) -> (SocketAddr, Shutdown, JoinHandle<std::io::Result<()>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.signal();
    let server = HttpServer::new(table, Arc::new(NullObserver));
    let task = tokio::spawn(async move { server.run(listener, signal).await });
    // Give the acceptor a moment to come up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown, task)
}

/// Test client that ignores any ambient proxy configuration.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client build failed")
}
