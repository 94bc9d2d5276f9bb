//! Per-request state threaded through the pipeline.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Extensions, HeaderMap, Method, StatusCode};

use crate::request::Request;
use crate::response::{ContentType, Response};

/// The mutable record every middleware and the endpoint see for one request.
///
/// A `Context` is created when a request arrives and dropped once its
/// response is sent. It is handed down the chain as `&mut Context`, so only
/// one stage touches it at a time and nothing outlives the request.
///
/// The response starts as an empty `404`. Setting a body while the status has
/// not been chosen explicitly moves it to `200`.
#[derive(Debug)]
pub struct Context {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    pub(crate) params: HashMap<String, String>,
    state: HashMap<String, String>,
    extensions: Extensions,
    response: Response,
    status_set: bool,
}

impl Context {
    /// A context for `method` on `target` (`/path` or `/path?query`), with no
    /// headers and an empty body.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        Self {
            method,
            path: path.to_owned(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            state: HashMap::new(),
            extensions: Extensions::new(),
            response: Response::default(),
            status_set: false,
        }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        let mut ctx = Self::new(parts.method, parts.uri.path());
        ctx.query = parts.uri.query().map(str::to_owned);
        ctx.headers = parts.headers;
        ctx.body = body;
        ctx
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    // ── Request side ──────────────────────────────────────────────────────────

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn request_body(&self) -> &[u8] { &self.body }

    /// Path parameter captured by the [`Router`](crate::Router).
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    // ── State bag ─────────────────────────────────────────────────────────────

    pub fn state(&self, key: &str) -> Option<&str> {
        self.state.get(key).map(String::as_str)
    }

    /// Stores a value for downstream stages. Returns the previous value.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.state.insert(key.into(), value.into())
    }

    /// Typed per-request values, keyed by type.
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    // ── Response side ─────────────────────────────────────────────────────────

    pub fn status(&self) -> StatusCode { self.response.status }

    pub fn set_status(&mut self, status: StatusCode) {
        self.response.status = status;
        self.status_set = true;
    }

    pub fn body(&self) -> &[u8] { &self.response.body }

    pub fn set_body(&mut self, content_type: ContentType, body: impl Into<Bytes>) {
        self.response.body = body.into();
        self.response.headers.insert(CONTENT_TYPE, content_type.header_value());
        if !self.status_set {
            self.response.status = StatusCode::OK;
        }
    }

    pub fn text(&mut self, body: impl Into<String>) {
        let body: String = body.into();
        self.set_body(ContentType::Text, body);
    }

    pub fn html(&mut self, body: impl Into<String>) {
        let body: String = body.into();
        self.set_body(ContentType::Html, body);
    }

    pub fn response(&self) -> &Response { &self.response }

    pub fn response_mut(&mut self) -> &mut Response { &mut self.response }

    /// Replaces the whole response, status included.
    pub fn set_response(&mut self, response: Response) {
        self.response = response;
        self.status_set = true;
    }

    pub(crate) fn take_response(&mut self) -> Response {
        self.status_set = false;
        std::mem::take(&mut self.response)
    }

    /// An owned snapshot handed to route handlers.
    pub(crate) fn to_request(&self) -> Request {
        Request::new(
            self.method.clone(),
            self.path.clone(),
            self.query.clone(),
            self.headers.clone(),
            self.body.clone(),
            self.params.clone(),
            self.state.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_query_from_path() {
        let ctx = Context::new(Method::GET, "/home?tab=news");
        assert_eq!(ctx.path(), "/home");
        assert_eq!(ctx.query(), Some("tab=news"));
    }

    #[test]
    fn request_side_is_independent_of_response_side() {
        let ctx = Context::new(Method::POST, "/users").with_body("name=alice");
        assert_eq!(ctx.request_body(), b"name=alice");
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn request_headers_are_readable_by_name() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", http::HeaderValue::from_static("abc"));
        let ctx = Context::new(Method::GET, "/").with_headers(headers);
        assert_eq!(ctx.headers()["x-request-id"], "abc");
        assert_eq!(ctx.to_request().header("X-Request-Id"), Some("abc"));
    }

    #[test]
    fn response_mut_edits_headers_in_place() {
        let mut ctx = Context::new(Method::GET, "/");
        ctx.html("<h1>index page</h1>");
        ctx.response_mut()
            .headers_mut()
            .insert(http::header::CACHE_CONTROL, http::HeaderValue::from_static("no-store"));
        assert_eq!(ctx.response().headers()[http::header::CACHE_CONTROL], "no-store");
        assert_eq!(ctx.status(), StatusCode::OK);
    }

    #[test]
    fn fresh_context_is_empty_not_found() {
        let ctx = Context::new(Method::GET, "/");
        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn setting_a_body_implies_ok() {
        let mut ctx = Context::new(Method::GET, "/");
        ctx.text("hello wordl!");
        assert_eq!(ctx.status(), StatusCode::OK);
        assert_eq!(ctx.body(), b"hello wordl!");
        assert_eq!(ctx.response().headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn explicit_status_survives_a_later_body() {
        let mut ctx = Context::new(Method::GET, "/");
        ctx.set_status(StatusCode::ACCEPTED);
        ctx.html("<p>queued</p>");
        assert_eq!(ctx.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn state_bag_round_trips_and_reaches_the_request_snapshot() {
        let mut ctx = Context::new(Method::GET, "/");
        assert_eq!(ctx.set_state("user", "alice"), None);
        assert_eq!(ctx.set_state("user", "bob").as_deref(), Some("alice"));
        assert_eq!(ctx.to_request().state("user"), Some("bob"));
    }

    #[test]
    fn take_response_resets_to_default() {
        let mut ctx = Context::new(Method::GET, "/");
        ctx.set_status(StatusCode::CREATED);
        let res = ctx.take_response();
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
    }
}
