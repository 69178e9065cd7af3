//! Embedding demo: route files compiled in, discovered at runtime.
//!
//! The handler modules below live inside `demos/routes/`, the same tree
//! the scanner walks, so the directory layout and the registered handlers
//! can never drift apart. Run with:
//!
//! ```text
//! cargo run --example embedded
//! curl http://127.0.0.1:3000/authors/1
//! curl http://127.0.0.1:3000/stream
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treeroute::{build_route_table, HandlerRegistry, HttpServer, TracingObserver};

#[path = "routes/get.rs"]
mod index_get;
#[path = "routes/authors/get.rs"]
mod authors_get;
#[path = "routes/authors/$authorId/get.rs"]
mod author_get;
#[path = "routes/stream/get.rs"]
mod stream_get;

/// Shared demo data set.
pub fn authors() -> &'static [(&'static str, &'static str)] {
    &[("1", "Ursula K. Le Guin"), ("2", "Stanisław Lem")]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treeroute=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut registry = HandlerRegistry::new();
    registry.register("get.rs", index_get::handler());
    registry.register("authors/get.rs", authors_get::handler());
    registry.register("authors/$authorId/get.rs", author_get::handler());
    registry.register("stream/get.rs", stream_get::handler());

    let observer = Arc::new(TracingObserver);
    let table = build_route_table(
        Path::new("demos/routes"),
        &registry,
        observer.as_ref(),
        &["rs".to_string()],
        1,
    )?;

    let server = HttpServer::new(table, observer);
    let listener = TcpListener::bind(("127.0.0.1", 3000)).await?;
    server
        .run(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
