//! GET /authors lists the known authors.

use std::sync::Arc;

use serde_json::json;
use treeroute::{handler_fn, Handler, HttpResult};

use crate::authors;

pub fn handler() -> Arc<dyn Handler> {
    handler_fn(|_req| async move {
        let list: Vec<_> = authors()
            .iter()
            .map(|(id, name)| json!({"id": id, "name": name}))
            .collect();
        Ok(HttpResult::ok(list))
    })
}
