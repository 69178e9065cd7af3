//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! treeroute.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → semantic validation
//!     → ServerConfig (immutable)
//!     → CLI flags override individual fields
//!     → flows into discovery and the dispatcher bootstrap
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; dev mode re-derives the route table,
//!   not the configuration
//! - All fields default so the file is optional

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{DevConfig, ListenerConfig, RoutesConfig, ServerConfig, TlsConfig};
