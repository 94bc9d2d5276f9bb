//! Radix-tree request router, usable as a pipeline [`Endpoint`].
//!
//! One tree per HTTP method. O(path-length) lookup. A route table is just
//! another endpoint: put middleware in front of it with
//! [`Pipeline::builder`](crate::Pipeline::builder).
//!
//! When nothing matches the router answers on its own:
//!
//! | Situation | Response |
//! |---|---|
//! | path registered, method not | `405` with `Allow` |
//! | same, but the method is `OPTIONS` | `200` with `Allow` |
//! | same, but the method is not a standard one | `501` |
//! | path not registered under any method | `404 Not Found` |
//!
//! Every GET route also answers HEAD, and `Allow` lists it.

use std::collections::HashMap;
use std::sync::Arc;

use http::header::{ALLOW, HeaderValue};
use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::context::Context;
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::pipeline::Endpoint;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup and hand it to
/// [`Builder::endpoint`](crate::pipeline::Builder::endpoint). Registration
/// methods return `self` so they chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

/// Methods the router knows how to refuse with `405`. Anything else on a
/// known path is `501`.
const IMPLEMENTED: [Method; 7] = [
    Method::DELETE,
    Method::GET,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
    Method::POST,
    Method::PUT,
];

enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    WrongMethod(Vec<Method>),
    UnknownMethod,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Also answers HEAD on `path` unless a HEAD route is registered.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        if let Some(found) = self.find(method, path) {
            return found;
        }
        // HEAD is answered by the GET route; hyper drops the body.
        if *method == Method::HEAD {
            if let Some(found) = self.find(&Method::GET, path) {
                return found;
            }
        }

        let mut allowed: Vec<Method> = Vec::new();
        for (m, tree) in &self.routes {
            if tree.at(path).is_ok() {
                allowed.push(m.clone());
                if *m == Method::GET {
                    allowed.push(Method::HEAD);
                }
            }
        }

        if allowed.is_empty() {
            Lookup::NotFound
        } else if !IMPLEMENTED.contains(method) {
            Lookup::UnknownMethod
        } else {
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            allowed.dedup();
            Lookup::WrongMethod(allowed)
        }
    }

    fn find(&self, method: &Method, path: &str) -> Option<Lookup> {
        let matched = self.routes.get(method)?.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some(Lookup::Found(handler, params))
    }

    async fn dispatch(&self, ctx: &mut Context) -> Result<(), Error> {
        match self.lookup(ctx.method(), ctx.path()) {
            Lookup::Found(handler, params) => {
                ctx.params = params;
                let response = handler.call(ctx.to_request()).await?;
                ctx.set_response(response);
            }
            Lookup::WrongMethod(allowed) => {
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                let status = if *ctx.method() == Method::OPTIONS {
                    StatusCode::OK
                } else {
                    StatusCode::METHOD_NOT_ALLOWED
                };
                debug!(method = %ctx.method(), path = %ctx.path(), %allow, "method not allowed");
                let mut builder = Response::builder().status(status);
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    builder = builder.header(ALLOW, value);
                }
                ctx.set_response(builder.no_body());
            }
            Lookup::UnknownMethod => {
                ctx.set_response(Response::status(StatusCode::NOT_IMPLEMENTED));
            }
            Lookup::NotFound => {
                ctx.set_response(
                    Response::builder().status(StatusCode::NOT_FOUND).text("Not Found"),
                );
            }
        }
        Ok(())
    }
}

impl Endpoint for Router {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(self.dispatch(ctx))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
