//! Observer interface for discovery and server lifecycle events.

use std::net::SocketAddr;

use crate::http::method::Verb;

/// Receives routing lifecycle notifications.
///
/// Discovery calls [`on_route_discovered`](RouterObserver::on_route_discovered)
/// once per binding, in traversal order. That is the same order that decides
/// match precedence, which makes the emitted listing a faithful picture of
/// the effective table.
pub trait RouterObserver: Send + Sync {
    fn on_route_discovered(&self, verb: Verb, pattern: &str) {
        let _ = (verb, pattern);
    }

    fn on_server_ready(&self, address: SocketAddr, scheme: &str) {
        let _ = (address, scheme);
    }
}

/// Default observer: structured logs via `tracing`.
pub struct TracingObserver;

impl RouterObserver for TracingObserver {
    fn on_route_discovered(&self, verb: Verb, pattern: &str) {
        tracing::info!(verb = %verb.as_upper(), pattern = %pattern, "Route discovered");
    }

    fn on_server_ready(&self, address: SocketAddr, scheme: &str) {
        tracing::info!(address = %address, scheme = %scheme, "Server ready");
    }
}

/// Observer that drops every notification. Useful in tests and embeddings
/// that do their own reporting.
pub struct NullObserver;

impl RouterObserver for NullObserver {}
