//! The dispatcher: serving core around the route table.
//!
//! # Responsibilities
//! - Own the catch-all route that every request funnels through
//! - Look up the table, run the per-request state machine
//!   (match → verb → enrich → invoke → materialize)
//! - Contain every failure path centrally
//! - Bind plaintext or TLS listeners from opaque key/cert material
//!
//! # Design Decisions
//! - The table sits in an atomic swap slot: a reload stores a whole new
//!   table and in-flight requests keep the snapshot they loaded
//! - 404 is bare; 405 carries `Allow` with the verbs that are registered
//! - A handler fault becomes a 500 with a generic JSON body only while
//!   nothing has been sent; once a stream's head is committed the fault is
//!   logged and the response is left alone

use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use futures_util::FutureExt;
use tokio::net::TcpListener;

use crate::http::method::Verb;
use crate::http::request::enrich;
use crate::http::result::HttpResult;
use crate::http::sink::{BufferedSink, StreamSink};
use crate::observability::RouterObserver;
use crate::routing::table::RouteTable;

/// Channel capacity for streaming response bodies.
const STREAM_BUFFER_CHUNKS: usize = 16;

/// How long a TLS listener waits for in-flight connections on shutdown.
const TLS_DRAIN_GRACE: Duration = Duration::from_secs(1);

/// State injected into the dispatch handler.
#[derive(Clone)]
struct AppState {
    table: Arc<ArcSwap<RouteTable>>,
}

/// HTTP server dispatching against a swappable route table.
pub struct HttpServer {
    state: AppState,
    observer: Arc<dyn RouterObserver>,
}

impl HttpServer {
    /// Creates a server around an initial table.
    pub fn new(table: RouteTable, observer: Arc<dyn RouterObserver>) -> Self {
        Self {
            state: AppState {
                table: Arc::new(ArcSwap::from_pointee(table)),
            },
            observer,
        }
    }

    /// Replaces the route table wholesale.
    ///
    /// In-flight requests finish against the snapshot they loaded; there is
    /// no partial-update visibility.
    pub fn swap_table(&self, table: RouteTable) {
        self.state.table.store(Arc::new(table));
    }

    /// The current table snapshot.
    pub fn table(&self) -> Arc<RouteTable> {
        self.state.table.load_full()
    }

    fn build_router(&self) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(self.state.clone())
    }

    /// Serves plaintext HTTP on an already-bound listener until `shutdown`
    /// resolves.
    pub async fn run(
        &self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        self.observer.on_server_ready(addr, "http");

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Serves HTTPS using pre-loaded certificate material until `shutdown`
    /// resolves. The key/cert contents are never interpreted here.
    pub async fn run_tls(
        &self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let handle = axum_server::Handle::new();

        {
            let handle = handle.clone();
            tokio::spawn(async move {
                shutdown.await;
                handle.graceful_shutdown(Some(TLS_DRAIN_GRACE));
            });
        }
        {
            let handle = handle.clone();
            let observer = Arc::clone(&self.observer);
            tokio::spawn(async move {
                if let Some(addr) = handle.listening().await {
                    observer.on_server_ready(addr, "https");
                }
            });
        }

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.build_router().into_make_service())
            .await
    }
}

/// Per-request pipeline. All failure paths terminate here.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();

    // Snapshot for the whole request; a concurrent reload cannot change
    // what this request observes.
    let table = state.table.load_full();

    let Some(matched) = table.match_path(&path) else {
        tracing::debug!(method = %parts.method, path = %path, "No route matched");
        return empty_status(StatusCode::NOT_FOUND);
    };

    let pattern = matched.entry.pattern().to_string();
    let handler = Verb::from_method(&parts.method)
        .and_then(|verb| matched.entry.handler(verb).cloned().map(|h| (verb, h)));
    let Some((verb, handler)) = handler else {
        tracing::debug!(
            method = %parts.method,
            path = %path,
            pattern = %pattern,
            "Verb not registered for matched route"
        );
        return method_not_allowed(matched.entry.allow_header());
    };
    let params = matched.params;

    // Whole-buffer body read; the declared simplicity boundary of this core.
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, path = %path, "Failed to read request body");
            return internal_error();
        }
    };

    let enriched = enrich(verb, parts.uri, parts.headers, params, &bytes);

    let result = match AssertUnwindSafe(handler.handle(enriched)).catch_unwind().await {
        Ok(Ok(result)) => result,
        Ok(Err(fault)) => {
            tracing::error!(error = %fault, pattern = %pattern, "Handler fault");
            return internal_error();
        }
        Err(_) => {
            tracing::error!(pattern = %pattern, "Handler panicked");
            return internal_error();
        }
    };

    if result.is_stream() {
        stream_response(result).await
    } else {
        let sink = BufferedSink::new();
        match result.materialize(Box::new(sink.clone())).await {
            // Buffered materialization sends nothing until here, so any
            // failure above still had the 500 path available.
            Ok(()) => sink.into_response(),
            Err(e) => {
                tracing::error!(error = %e, pattern = %pattern, "Result materialization failed");
                internal_error()
            }
        }
    }
}

/// Runs a stream result: the writer owns the sink, the response body is
/// fed from the sink's channel.
async fn stream_response(result: HttpResult) -> Response {
    let (sink, head_rx, body_rx) = StreamSink::channel(STREAM_BUFFER_CHUNKS);
    let writer = tokio::spawn(result.materialize(Box::new(sink)));

    match head_rx.await {
        Ok(head) => {
            // Head is on the wire; faults from here on are log-only.
            tokio::spawn(async move {
                match writer.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Stream writer failed after response began");
                    }
                    Err(_) => tracing::error!("Stream writer panicked"),
                }
            });

            let stream = futures_util::stream::unfold(body_rx, |mut rx| async move {
                rx.recv()
                    .await
                    .map(|chunk| (Ok::<_, std::convert::Infallible>(chunk), rx))
            });
            let mut response = Response::new(Body::from_stream(stream));
            *response.status_mut() = head.status;
            *response.headers_mut() = head.headers;
            response
        }
        Err(_) => {
            // The head never committed: nothing reached the client.
            match writer.await {
                Ok(Ok(())) => {
                    tracing::warn!("Stream writer finished without producing a response");
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Stream writer failed before response began");
                }
                Err(_) => tracing::error!("Stream writer panicked"),
            }
            internal_error()
        }
    }
}

fn empty_status(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

fn method_not_allowed(allow: String) -> Response {
    let mut response = empty_status(StatusCode::METHOD_NOT_ALLOWED);
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

fn internal_error() -> Response {
    let mut response = Response::new(Body::from(r#"{"error":"Internal Server Error"}"#));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
