//! Request enrichment: params, query and body on one object.
//!
//! # Responsibilities
//! - Parse the query string into a flat map (repeated keys: last wins)
//! - Parse the buffered body by declared content type
//! - Assemble the read-only request handed to handlers
//!
//! # Design Decisions
//! - Enrichment never fails: malformed JSON degrades to an empty object,
//!   anything unrecognized passes through as raw text
//! - The whole body is buffered with no size cap, a documented boundary
//!   of this core rather than an accident

use std::collections::HashMap;

use axum::http::{header, HeaderMap, Uri};

use crate::http::method::Verb;

/// A parsed request body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    /// `application/json` payloads. Malformed payloads become the empty
    /// object rather than failing the request.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` payloads as a flat map.
    Form(HashMap<String, String>),
    /// Any other (or missing) content type: the raw decoded text.
    Text(String),
}

/// The request a handler receives: transport parts plus extracted
/// parameters, parsed query and parsed body. Read-only by contract.
#[derive(Debug)]
pub struct EnrichedRequest {
    pub verb: Verb,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Option<BodyValue>,
}

impl EnrichedRequest {
    /// A path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A query value by key.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// The JSON body, if the request carried one.
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Some(BodyValue::Json(value)) => Some(value),
            _ => None,
        }
    }
}

/// Builds the enriched request from the matched parameters and the fully
/// buffered body. Infallible by design.
pub fn enrich(
    verb: Verb,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    body: &[u8],
) -> EnrichedRequest {
    let query = parse_query(uri.query().unwrap_or(""));
    let body = parse_body(&headers, body);
    EnrichedRequest {
        verb,
        uri,
        headers,
        params,
        query,
        body,
    }
}

/// Every key in the query string becomes an entry; repeated keys keep the
/// last value.
fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn parse_body(headers: &HeaderMap, data: &[u8]) -> Option<BodyValue> {
    if data.is_empty() {
        return None;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.contains("application/json") {
        let value = serde_json::from_slice(data)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
        return Some(BodyValue::Json(value));
    }

    if content_type.contains("application/x-www-form-urlencoded") {
        let form = url::form_urlencoded::parse(data)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        return Some(BodyValue::Form(form));
    }

    Some(BodyValue::Text(String::from_utf8_lossy(data).into_owned()))
}
