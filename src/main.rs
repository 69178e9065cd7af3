//! treeroute binary: preview server and route-tree inspector.
//!
//! Handlers cannot be loaded from source files at runtime, so the binary
//! binds every discovered route to a 501 stub: enough to preview a tree's
//! shape and effective match order. Embedding applications get real
//! handlers by calling [`treeroute::cli::run`] with a populated
//! [`HandlerRegistry`](treeroute::routing::HandlerRegistry).

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treeroute::cli::{self, Cli};
use treeroute::routing::StubLoader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treeroute=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("treeroute v{} starting", env!("CARGO_PKG_VERSION"));

    let args = Cli::parse();
    cli::run(args, Arc::new(StubLoader)).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
