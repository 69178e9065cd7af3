//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from `treeroute.toml`;
//! every field has a default so a minimal (or absent) file works.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener settings (host, port).
    pub listener: ListenerConfig,

    /// Route discovery settings.
    pub routes: RoutesConfig,

    /// Optional TLS material; both paths or neither.
    pub tls: Option<TlsConfig>,

    /// Dev-mode watch settings.
    pub dev: DevConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address to bind (e.g. "127.0.0.1").
    pub host: IpAddr,

    /// Port to listen on.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
        }
    }
}

impl ListenerConfig {
    /// The socket address these settings describe.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Route discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Root of the routes directory tree.
    pub dir: PathBuf,

    /// File extensions treated as route sources.
    pub extensions: Vec<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("routes"),
            extensions: crate::routing::discover::DEFAULT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// TLS file paths (PEM).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to the certificate file.
    pub cert_path: PathBuf,

    /// Path to the private key file.
    pub key_path: PathBuf,
}

/// Dev-mode watch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevConfig {
    /// Glob patterns that force-include paths the excludes would drop.
    pub include: Vec<String>,

    /// Glob patterns excluded from watch-triggered rebuilds, on top of the
    /// built-in defaults.
    pub exclude: Vec<String>,

    /// Quiet period after the last change before restarting.
    pub debounce_ms: u64,

    /// Grace period for in-flight connections when tearing a server down.
    pub drain_ms: u64,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            debounce_ms: 300,
            drain_ms: 1000,
        }
    }
}
