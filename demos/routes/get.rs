//! GET / serves the service banner.

use std::sync::Arc;

use serde_json::json;
use treeroute::{handler_fn, Handler, HttpResult};

pub fn handler() -> Arc<dyn Handler> {
    handler_fn(|_req| async move {
        Ok(HttpResult::ok(json!({
            "service": "treeroute demo",
            "endpoints": ["/authors", "/authors/:authorId", "/stream"],
        })))
    })
}
