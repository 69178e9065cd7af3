//! GET /stream emits server-sent events, one per second for ten seconds.
//!
//! Demonstrates the stream escape hatch: the writer owns the sink, sets
//! the head itself, and stops as soon as a write reports disconnect.

use std::sync::Arc;
use std::time::Duration;

use treeroute::http::{header, Bytes, HeaderValue, StatusCode};
use treeroute::{handler_fn, Handler, HttpResult};

pub fn handler() -> Arc<dyn Handler> {
    handler_fn(|_req| async move {
        Ok(HttpResult::stream(|mut sink| async move {
            sink.set_status(StatusCode::OK);
            sink.insert_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/event-stream"),
            );
            sink.insert_header(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache"),
            );

            for count in 1..=10u32 {
                let event = format!("data: {{\"message\":\"Event {count}\"}}\n\n");
                if sink.write(Bytes::from(event)).await.is_err() {
                    // Client disconnected; stop writing.
                    return Ok(());
                }
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            sink.end().await?;
            Ok(())
        }))
    })
}
