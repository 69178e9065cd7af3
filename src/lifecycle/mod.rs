//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Build route table → Bind listener → Serve
//!
//! Shutdown:
//!     Ctrl-C → trigger Shutdown → stop accepting → drain in-flight → exit
//!
//! Dev restart:
//!     Change debounced → trigger per-generation Shutdown → bounded drain
//!     → rebuild table (fresh generation) → re-bind → serve
//! ```
//!
//! # Design Decisions
//! - The listener is torn down before the replacement binds, so the port
//!   is free to rebind and no two servers accept at once
//! - Draining is bounded; a stuck connection cannot block a dev restart

pub mod shutdown;

pub use shutdown::Shutdown;
