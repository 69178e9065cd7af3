//! Shutdown coordination.

use tokio::sync::broadcast;

/// Coordinator for graceful teardown.
///
/// Wraps a broadcast channel that serving tasks subscribe to. Dev mode
/// creates one per serving generation (restart trigger) in addition to the
/// process-wide one (Ctrl-C).
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Triggers the shutdown signal. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// A future that resolves when shutdown is triggered.
    ///
    /// Suitable for `with_graceful_shutdown`; also resolves if the
    /// coordinator is dropped, so orphaned servers wind down.
    pub fn signal(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
