//! The result protocol: handler return values that write themselves.
//!
//! # Responsibilities
//! - Carry status, caller headers, and a body-writing strategy
//! - Materialize exactly once against a [`ResponseSink`]
//! - Offer the constructor vocabulary handlers build responses with
//!
//! # Design Decisions
//! - Mandatory content-type headers are applied after caller headers, so
//!   they win on key collision (kept behavior; see DESIGN.md)
//! - `stream` hands the sink to the caller's writer and takes over nothing:
//!   status, headers, chunking and completion are the writer's business

use std::future::Future;

use axum::body::Bytes;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use thiserror::Error;

use crate::http::sink::{ResponseSink, SinkError};
use crate::routing::handler::HandlerError;

/// Failure while writing a result to its sink.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("failed to serialize response body")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("stream writer failed: {0}")]
    Stream(HandlerError),
}

type StreamWriter =
    Box<dyn FnOnce(Box<dyn ResponseSink>) -> BoxFuture<'static, Result<(), HandlerError>> + Send>;

enum ResultBody {
    Empty,
    Json(Result<serde_json::Value, serde_json::Error>),
    Text(String),
    Stream(StreamWriter),
}

/// A self-materializing response descriptor.
///
/// Created by a handler, consumed exactly once by the dispatcher.
pub struct HttpResult {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: ResultBody,
}

impl HttpResult {
    fn with_body(status: StatusCode, body: ResultBody) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// 200 with a JSON body.
    pub fn ok<T: Serialize>(data: T) -> Self {
        Self::json(data, StatusCode::OK)
    }

    /// 201 with a JSON body.
    pub fn created<T: Serialize>(data: T) -> Self {
        Self::json(data, StatusCode::CREATED)
    }

    /// Arbitrary status with a JSON body.
    pub fn json<T: Serialize>(data: T, status: StatusCode) -> Self {
        Self::with_body(status, ResultBody::Json(serde_json::to_value(data)))
    }

    /// 200 with a plain-text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_body(StatusCode::OK, ResultBody::Text(body.into()))
    }

    /// 404, status only.
    pub fn not_found() -> Self {
        Self::status(StatusCode::NOT_FOUND)
    }

    /// 404 with a JSON body.
    pub fn not_found_with<T: Serialize>(data: T) -> Self {
        Self::json(data, StatusCode::NOT_FOUND)
    }

    /// 400, status only.
    pub fn bad_request() -> Self {
        Self::status(StatusCode::BAD_REQUEST)
    }

    /// 400 with a JSON body.
    pub fn bad_request_with<T: Serialize>(data: T) -> Self {
        Self::json(data, StatusCode::BAD_REQUEST)
    }

    /// 204, status only.
    pub fn no_content() -> Self {
        Self::status(StatusCode::NO_CONTENT)
    }

    /// Arbitrary status, empty body.
    pub fn status(status: StatusCode) -> Self {
        Self::with_body(status, ResultBody::Empty)
    }

    /// Defers all response writing to `writer`.
    ///
    /// The writer receives the live sink and controls status, headers,
    /// chunked writes and completion. It is the only result variant that
    /// may keep the response open across multiple awaits; it must stop
    /// writing once a write reports [`SinkError::Closed`].
    pub fn stream<F, Fut>(writer: F) -> Self
    where
        F: FnOnce(Box<dyn ResponseSink>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::with_body(
            StatusCode::OK,
            ResultBody::Stream(Box::new(move |sink| writer(sink).boxed())),
        )
    }

    /// Adds a caller-supplied header.
    ///
    /// Mandatory content-type headers are applied later during
    /// materialization and replace a caller header of the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Whether this result defers writing to a stream writer.
    pub fn is_stream(&self) -> bool {
        matches!(self.body, ResultBody::Stream(_))
    }

    /// The status this result will set (streams decide their own).
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Writes this result to the sink. Must be invoked exactly once.
    pub async fn materialize(
        self,
        mut sink: Box<dyn ResponseSink>,
    ) -> Result<(), MaterializeError> {
        match self.body {
            ResultBody::Empty => {
                sink.set_status(self.status);
                for (name, value) in self.headers {
                    sink.insert_header(name, value);
                }
                sink.end().await?;
                Ok(())
            }
            ResultBody::Json(value) => {
                let value = value?;
                let payload = serde_json::to_vec(&value)?;
                sink.set_status(self.status);
                for (name, value) in self.headers {
                    sink.insert_header(name, value);
                }
                sink.insert_header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                sink.write(Bytes::from(payload)).await?;
                sink.end().await?;
                Ok(())
            }
            ResultBody::Text(text) => {
                sink.set_status(self.status);
                for (name, value) in self.headers {
                    sink.insert_header(name, value);
                }
                sink.insert_header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain"),
                );
                sink.write(Bytes::from(text)).await?;
                sink.end().await?;
                Ok(())
            }
            ResultBody::Stream(writer) => {
                writer(sink).await.map_err(MaterializeError::Stream)
            }
        }
    }
}
