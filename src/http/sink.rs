//! The response sink capability and its two implementations.
//!
//! # Responsibilities
//! - Define the narrow surface results write themselves through
//! - Buffer complete responses for the common case
//! - Stream chunked responses through a channel, surfacing peer disconnect
//!
//! # Design Decisions
//! - The head (status + headers) commits on the first write or on end;
//!   status and headers set after that point are ignored
//! - A streaming sink's `write` fails with `SinkError::Closed` once the
//!   peer is gone; that error is the disconnect signal writers observe

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Write-side failure of a response sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The peer disconnected; no further writes will be delivered.
    #[error("peer disconnected before the response completed")]
    Closed,

    /// The response was already ended.
    #[error("response already completed")]
    Completed,
}

/// The surface a [`HttpResult`](crate::http::result::HttpResult) writes
/// itself through. Any concrete HTTP response type can sit behind this.
#[async_trait]
pub trait ResponseSink: Send {
    /// Sets the status code. Ignored once the head has committed.
    fn set_status(&mut self, status: StatusCode);

    /// Sets a header, replacing any existing value for the name. Ignored
    /// once the head has committed.
    fn insert_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Writes a body chunk, committing the head first if necessary.
    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError>;

    /// Completes the response. Commits the head if nothing was written.
    async fn end(&mut self) -> Result<(), SinkError>;
}

struct Collected {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    ended: bool,
}

/// Collects the whole response in memory.
///
/// Clones share the collected state: the dispatcher keeps one clone, hands
/// the other to `materialize`, and converts the shared state into the
/// transport response afterwards.
#[derive(Clone)]
pub struct BufferedSink {
    state: Arc<Mutex<Collected>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(Collected {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: Vec::new(),
                ended: false,
            })),
        }
    }

    /// Converts the collected response into the transport representation.
    pub fn into_response(self) -> Response {
        let mut state = self.state.lock().expect("buffered sink poisoned");
        let mut response = Response::new(Body::from(std::mem::take(&mut state.body)));
        *response.status_mut() = state.status;
        *response.headers_mut() = std::mem::take(&mut state.headers);
        response
    }
}

impl Default for BufferedSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseSink for BufferedSink {
    fn set_status(&mut self, status: StatusCode) {
        let mut state = self.state.lock().expect("buffered sink poisoned");
        if !state.ended {
            state.status = status;
        }
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        let mut state = self.state.lock().expect("buffered sink poisoned");
        if !state.ended {
            state.headers.insert(name, value);
        }
    }

    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        let mut state = self.state.lock().expect("buffered sink poisoned");
        if state.ended {
            return Err(SinkError::Completed);
        }
        state.body.extend_from_slice(&chunk);
        Ok(())
    }

    async fn end(&mut self) -> Result<(), SinkError> {
        let mut state = self.state.lock().expect("buffered sink poisoned");
        if state.ended {
            return Err(SinkError::Completed);
        }
        state.ended = true;
        Ok(())
    }
}

/// The committed head of a streaming response.
pub(crate) struct Head {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Streams the body through a bounded channel while the dispatcher holds
/// the receiving end. Dropping the receiver (peer gone) makes subsequent
/// writes fail with [`SinkError::Closed`].
pub struct StreamSink {
    status: StatusCode,
    headers: HeaderMap,
    head_tx: Option<oneshot::Sender<Head>>,
    body_tx: Option<mpsc::Sender<Bytes>>,
}

impl StreamSink {
    /// Creates a sink plus the dispatcher's receiving ends.
    pub(crate) fn channel(
        capacity: usize,
    ) -> (Self, oneshot::Receiver<Head>, mpsc::Receiver<Bytes>) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(capacity);
        (
            Self {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                head_tx: Some(head_tx),
                body_tx: Some(body_tx),
            },
            head_rx,
            body_rx,
        )
    }

    fn commit_head(&mut self) -> Result<(), SinkError> {
        if let Some(tx) = self.head_tx.take() {
            let head = Head {
                status: self.status,
                headers: std::mem::take(&mut self.headers),
            };
            // A dropped head receiver means the request was abandoned.
            tx.send(head).map_err(|_| SinkError::Closed)?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseSink for StreamSink {
    fn set_status(&mut self, status: StatusCode) {
        if self.head_tx.is_some() {
            self.status = status;
        }
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.head_tx.is_some() {
            self.headers.insert(name, value);
        }
    }

    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        self.commit_head()?;
        match &self.body_tx {
            Some(tx) => tx.send(chunk).await.map_err(|_| SinkError::Closed),
            None => Err(SinkError::Completed),
        }
    }

    async fn end(&mut self) -> Result<(), SinkError> {
        self.commit_head()?;
        if self.body_tx.take().is_none() {
            return Err(SinkError::Completed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffered_sink_collects_status_headers_body() {
        let mut sink = BufferedSink::new();
        sink.set_status(StatusCode::CREATED);
        sink.insert_header(
            HeaderName::from_static("x-thing"),
            HeaderValue::from_static("1"),
        );
        sink.write(Bytes::from_static(b"hello ")).await.unwrap();
        sink.write(Bytes::from_static(b"world")).await.unwrap();
        sink.end().await.unwrap();

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get("x-thing"),
            Some(&HeaderValue::from_static("1"))
        );
    }

    #[tokio::test]
    async fn buffered_sink_rejects_writes_after_end() {
        let mut sink = BufferedSink::new();
        sink.end().await.unwrap();
        assert!(matches!(
            sink.write(Bytes::from_static(b"late")).await,
            Err(SinkError::Completed)
        ));
    }

    #[tokio::test]
    async fn stream_sink_commits_head_on_first_write() {
        let (mut sink, head_rx, mut body_rx) = StreamSink::channel(4);
        sink.set_status(StatusCode::OK);
        sink.insert_header(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("text/event-stream"),
        );
        sink.write(Bytes::from_static(b"data: 1\n\n")).await.unwrap();

        let head = head_rx.await.unwrap();
        assert_eq!(head.status, StatusCode::OK);
        assert_eq!(
            head.headers.get("content-type"),
            Some(&HeaderValue::from_static("text/event-stream"))
        );
        assert_eq!(body_rx.recv().await.unwrap(), Bytes::from_static(b"data: 1\n\n"));

        // Status changes after the head committed are ignored.
        sink.set_status(StatusCode::IM_A_TEAPOT);
        sink.end().await.unwrap();
        assert!(body_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stream_sink_write_fails_after_receiver_drops() {
        let (mut sink, _head_rx, body_rx) = StreamSink::channel(1);
        drop(body_rx);
        let err = sink.write(Bytes::from_static(b"chunk")).await.unwrap_err();
        assert!(matches!(err, SinkError::Closed));
    }
}
