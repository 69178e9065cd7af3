//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → server.rs (catch-all dispatch: table lookup, 404/405)
//!     → request.rs (enrichment: params, query, buffered body)
//!     → user handler (external, returns an HttpResult)
//!     → result.rs (self-materializing response descriptor)
//!     → sink.rs (buffered or streaming write to the transport)
//! ```
//!
//! # Design Decisions
//! - Handlers never touch the transport response directly; everything goes
//!   through the ResponseSink capability
//! - Failure containment lives in the dispatcher, nowhere else

pub mod method;
pub mod request;
pub mod result;
pub mod server;
pub mod sink;
pub mod tls;

// Transport types that appear in this crate's public API.
pub use axum::body::Bytes;
pub use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};

pub use method::{Verb, VERBS};
pub use request::{enrich, BodyValue, EnrichedRequest};
pub use result::{HttpResult, MaterializeError};
pub use server::HttpServer;
pub use sink::{BufferedSink, ResponseSink, SinkError, StreamSink};
pub use tls::load_tls_config;
