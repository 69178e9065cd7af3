//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Table Build (startup, dev-mode rebuild):
//!     routes directory
//!     → discover.rs (walk tree, $name → :name, verb files → bindings)
//!     → handler.rs (resolve route files through the HandlerLoader)
//!     → table.rs (RouteTable: pattern → verb → handler, insertion order)
//!
//! Per Request:
//!     request path
//!     → table.rs (scan entries in insertion order)
//!     → pattern.rs (segment matching, parameter extraction)
//!     → RouteMatch handed to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Tables are immutable once built; reloads build a new table
//! - First match wins, in filesystem traversal order; deliberately not
//!   most-specific-first
//! - No regex in the hot path

pub mod discover;
pub mod handler;
pub mod pattern;
pub mod table;
pub mod watcher;

pub use discover::{build_route_table, DiscoveryError, DEFAULT_EXTENSIONS};
pub use handler::{
    handler_fn, Handler, HandlerError, HandlerLoader, HandlerRegistry, LoadError, RouteSource,
    StubLoader,
};
pub use pattern::CompiledPattern;
pub use table::{RouteEntry, RouteMatch, RouteTable};
pub use watcher::{ChangeWatcher, WatchFilter, DEFAULT_EXCLUDES};
