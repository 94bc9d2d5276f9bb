//! Request snapshot handed to route handlers.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method};

/// An owned view of the request a route handler is answering.
///
/// Built from the [`Context`](crate::Context) when the [`Router`](crate::Router)
/// dispatches, so handlers can be plain `async fn(Request)` without borrowing
/// the context across an `.await`. It also carries the context's state bag as
/// it stood at dispatch time.
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    state: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        query: Option<String>,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
        state: HashMap<String, String>,
    ) -> Self {
        Self { method, path, query, headers, body, params, state }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// A value an upstream middleware put in the context's state bag.
    pub fn state(&self, key: &str) -> Option<&str> {
        self.state.get(key).map(String::as_str)
    }
}
