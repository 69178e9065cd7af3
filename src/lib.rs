//! File-tree HTTP routing toolkit.
//!
//! A directory layout becomes a route table: subdirectories are path
//! segments (`$name` directories are `:name` parameters), files named after
//! HTTP verbs bind handlers, and the dispatcher serves the table with
//! first-match-wins precedence in filesystem traversal order.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes/                      ┌──────────────────────────────────────┐
//!   ├── get.rs                   │              TREEROUTE               │
//!   ├── authors/                 │                                      │
//!   │   ├── get.rs               │  ┌──────────┐     ┌──────────────┐   │
//!   │   └── $authorId/           │  │ routing  │────▶│  RouteTable  │   │
//!   │       └── get.rs           │  │ discover │     │ (arc-swapped)│   │
//!   └── stream/                  │  └──────────┘     └──────┬───────┘   │
//!       └── get.rs               │        ▲                 │           │
//!                                │        │                 ▼           │
//!   Client Request ──────────────┼──▶ ┌───┴────┐      ┌──────────┐      │
//!                                │    │ notify │      │   http   │      │
//!   Client Response ◀────────────┼─── │watcher │      │ dispatch │      │
//!                                │    │ (dev)  │      │  + sink  │      │
//!                                │    └────────┘      └──────────┘      │
//!                                └──────────────────────────────────────┘
//! ```
//!
//! Handlers receive an [`EnrichedRequest`] (params, query, parsed body) and
//! return an [`HttpResult`] that writes itself to the response.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod cli;
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::method::Verb;
pub use http::request::{BodyValue, EnrichedRequest};
pub use http::result::HttpResult;
pub use http::server::HttpServer;
pub use http::sink::{ResponseSink, SinkError};
pub use lifecycle::Shutdown;
pub use observability::{NullObserver, RouterObserver, TracingObserver};
pub use routing::discover::{build_route_table, DiscoveryError};
pub use routing::handler::{
    handler_fn, Handler, HandlerError, HandlerLoader, HandlerRegistry, StubLoader,
};
pub use routing::table::{RouteMatch, RouteTable};
