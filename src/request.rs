//! Incoming HTTP request type.
//!
//! A [`Request`] owns everything the middleware pipeline reads: headers, the
//! raw body bytes, the decoded body, path params, the decoded query, and the
//! transaction id once the tagger has run.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use crate::method::Method;
use crate::middleware::TransactionId;

/// An incoming HTTP request.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) raw_body: Bytes,
    pub(crate) body: Value,
    pub(crate) params: Map<String, Value>,
    pub(crate) query: Map<String, Value>,
    pub(crate) tx_id: Option<TransactionId>,
}

impl Request {
    /// Creates a request for `target`, a path with an optional query string
    /// (`/users?page=2`). The body starts out as an empty object; the body
    /// parser middleware decodes [`with_body`](Request::with_body) bytes.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, decode_form(query.as_bytes())),
            None => (target, Map::new()),
        };
        Self {
            method,
            path: path.to_owned(),
            headers: HeaderMap::new(),
            raw_body: Bytes::new(),
            body: Value::Object(Map::new()),
            params: Map::new(),
            query,
            tx_id: None,
        }
    }

    pub(crate) fn from_http(parts: http::request::Parts, body: Bytes) -> Option<Self> {
        let method = Method::try_from(&parts.method).ok()?;
        let mut req = Self::new(method, parts.uri.path());
        req.query = parts.uri.query().map(|q| decode_form(q.as_bytes())).unwrap_or_default();
        req.headers = parts.headers;
        req.raw_body = body;
        Some(req)
    }

    /// Adds a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) =
            (HeaderName::try_from(name), HeaderValue::try_from(value))
        {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.raw_body = body.into();
        self
    }

    /// Sets the decoded body directly, bypassing the body parser.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn raw_body(&self) -> &[u8] { &self.raw_body }
    pub fn body(&self) -> &Value { &self.body }
    pub fn params(&self) -> &Map<String, Value> { &self.params }
    pub fn query(&self) -> &Map<String, Value> { &self.query }

    /// The transaction id assigned by the tagger, if it has run.
    pub fn tx_id(&self) -> Option<&TransactionId> {
        self.tx_id.as_ref()
    }

    /// Header lookup. `HeaderMap` keys are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Returns a query parameter. Repeated keys yield the first value.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        match self.query.get(key)? {
            Value::String(s) => Some(s),
            Value::Array(items) => items.first().and_then(Value::as_str),
            _ => None,
        }
    }

    /// Body, params and query merged into one object. On key clashes the body
    /// wins over params and params win over query.
    ///
    /// Array bodies contribute their indices as keys; scalar bodies
    /// contribute nothing.
    pub fn combined_input(&self) -> Map<String, Value> {
        let mut merged = self.query.clone();
        merged.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        match &self.body {
            Value::Object(body) => merged.extend(body.iter().map(|(k, v)| (k.clone(), v.clone()))),
            Value::Array(items) => merged.extend(
                items.iter().enumerate().map(|(i, v)| (i.to_string(), v.clone())),
            ),
            _ => {}
        }
        merged
    }

    /// `{body, params, query}` snapshot used by the transaction logger.
    pub fn snapshot(&self) -> Value {
        serde_json::json!({
            "body": self.body,
            "params": self.params,
            "query": self.query,
        })
    }

    pub(crate) fn set_params(&mut self, params: Map<String, Value>) {
        self.params = params;
    }
}

/// Decodes `a=1&b=2&a=3` into an object. Repeated keys collect into an array.
pub(crate) fn decode_form(input: &[u8]) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        let value = Value::String(value.into_owned());
        match out.get_mut(key.as_ref()) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                out.insert(key.into_owned(), value);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_splits_path_and_query() {
        let req = Request::new(Method::Get, "/items?page=2&tag=a&tag=b");
        assert_eq!(req.path(), "/items");
        assert_eq!(req.query_param("page"), Some("2"));
        assert_eq!(req.query()["tag"], json!(["a", "b"]));
        assert_eq!(req.query_param("tag"), Some("a"));
    }

    #[test]
    fn body_wins_over_query() {
        let req = Request::new(Method::Post, "/x?x=B&only=q").with_json(json!({ "x": "A" }));
        let merged = req.combined_input();
        assert_eq!(merged["x"], "A");
        assert_eq!(merged["only"], "q");
    }

    #[test]
    fn params_win_over_query_and_lose_to_body() {
        let mut req = Request::new(Method::Post, "/x?id=q&slug=q").with_json(json!({ "id": "b" }));
        let mut params = Map::new();
        params.insert("id".into(), json!("p"));
        params.insert("slug".into(), json!("p"));
        req.set_params(params);
        let merged = req.combined_input();
        assert_eq!(merged["id"], "b");
        assert_eq!(merged["slug"], "p");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::new(Method::Get, "/").with_header("Content-Type", "application/json");
        assert_eq!(req.header("content-type"), Some("application/json"));
    }
}
