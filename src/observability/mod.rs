//! Observability subsystem.
//!
//! # Design Decisions
//! - The routing core reports lifecycle moments through an injected
//!   observer rather than logging directly, so embedders can route them
//!   anywhere; the default observer logs via `tracing`
//! - Per-request logging stays in the dispatcher as structured `tracing`
//!   events with named fields

pub mod observer;

pub use observer::{NullObserver, RouterObserver, TracingObserver};
