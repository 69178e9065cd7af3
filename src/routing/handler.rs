//! Handler contract and handler loading.
//!
//! # Responsibilities
//! - Define the callable contract a route file resolves to
//! - Define the loading capability discovery uses to resolve route files
//! - Provide the two stock loaders: compile-time registry and preview stubs
//!
//! # Design Decisions
//! - Loading is a capability interface, not a fixed mechanism: a registry
//!   covers embedding, and implementations backed by real dynamic loading
//!   (dylibs, WASM) plug in behind the same trait
//! - Every table build passes a fresh `generation` token to the loader, so
//!   caching loaders observe on-disk edits between builds
//! - Registry keys are route-file paths relative to the routes root, which
//!   keeps registration independent of where the tree is mounted

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::http::request::EnrichedRequest;
use crate::http::result::HttpResult;

/// Error type handlers report; routed to the dispatcher's failure path.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A user-supplied callable bound to one (path, verb) pair.
///
/// Returning `Err` is the handler-fault signal: the dispatcher logs it and
/// answers 500 if the response has not started.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: EnrichedRequest) -> Result<HttpResult, HandlerError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(EnrichedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResult, HandlerError>> + Send,
{
    async fn handle(&self, request: EnrichedRequest) -> Result<HttpResult, HandlerError> {
        (self.0)(request).await
    }
}

/// Wraps an async function or closure as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(EnrichedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResult, HandlerError>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// A route file as seen by discovery.
#[derive(Debug, Clone)]
pub struct RouteSource {
    /// Path as walked, rooted at the scan root's parent context.
    pub path: PathBuf,
    /// Path relative to the routes root; the registry key.
    pub relative: PathBuf,
}

/// Error resolving a route file to a handler.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no handler registered for route file {}", .0.display())]
    Unregistered(PathBuf),

    #[error("handler load failed for {}: {message}", .path.display())]
    Failed { path: PathBuf, message: String },
}

/// Capability for resolving a discovered route file into a handler.
///
/// `generation` increases with every table build; loaders that cache must
/// key on it so repeated builds observe on-disk edits.
pub trait HandlerLoader: Send + Sync {
    fn load(&self, source: &RouteSource, generation: u64) -> Result<Arc<dyn Handler>, LoadError>;
}

/// Compile-time handler registration, keyed by relative route-file path.
///
/// The embedding application registers one handler per route file it ships
/// (e.g. `authors/$authorId/get.rs`) and hands the registry to discovery.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<PathBuf, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a route file path relative to the routes root.
    pub fn register(&mut self, relative: impl Into<PathBuf>, handler: Arc<dyn Handler>) {
        self.entries.insert(relative.into(), handler);
    }

    /// Registers an async function for a route file path.
    pub fn register_fn<F, Fut>(&mut self, relative: impl Into<PathBuf>, f: F)
    where
        F: Fn(EnrichedRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResult, HandlerError>> + Send + 'static,
    {
        self.register(relative, handler_fn(f));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, relative: &Path) -> Option<&Arc<dyn Handler>> {
        self.entries.get(relative)
    }
}

impl HandlerLoader for HandlerRegistry {
    fn load(&self, source: &RouteSource, _generation: u64) -> Result<Arc<dyn Handler>, LoadError> {
        self.get(&source.relative)
            .cloned()
            .ok_or_else(|| LoadError::Unregistered(source.relative.clone()))
    }
}

/// Binds every discovered route file to a 501 responder.
///
/// Powers the binary's preview mode and the `routes` listing, where the
/// shape of the tree matters but no application handlers exist.
pub struct StubLoader;

impl HandlerLoader for StubLoader {
    fn load(&self, source: &RouteSource, _generation: u64) -> Result<Arc<dyn Handler>, LoadError> {
        let file = source.relative.display().to_string();
        Ok(handler_fn(move |_req| {
            let file = file.clone();
            async move {
                Ok(HttpResult::json(
                    serde_json::json!({
                        "error": "Not Implemented",
                        "route_file": file,
                    }),
                    axum::http::StatusCode::NOT_IMPLEMENTED,
                ))
            }
        }))
    }
}
