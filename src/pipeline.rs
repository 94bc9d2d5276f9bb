//! The composed request pipeline.
//!
//! A [`Pipeline`] is an ordered list of [`Middleware`] plus exactly one
//! [`Endpoint`]. It is built once at startup and never changes afterwards:
//! the builder is consumed by [`Builder::endpoint`], and `Pipeline` itself has
//! no way to add or remove stages. Every request walks the same list with its
//! own [`Context`].

use tracing::error;

use crate::context::Context;
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::response::Response;

/// The innermost stage. It produces the response and has no `Next` to call.
pub trait Endpoint: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), Error>>;
}

/// Endpoint built from a closure.
///
/// ```rust
/// use onion::endpoint_fn;
///
/// let hello = endpoint_fn(|ctx| Box::pin(async move {
///     ctx.text("hello wordl!");
///     Ok(())
/// }));
/// ```
pub fn endpoint_fn<F>(f: F) -> FnEndpoint<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
{
    FnEndpoint(f)
}

/// See [`endpoint_fn`].
pub struct FnEndpoint<F>(F);

impl<F> Endpoint for FnEndpoint<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), Error>> {
        (self.0)(ctx)
    }
}

/// Middleware in registration order, wrapped around one endpoint.
pub struct Pipeline {
    middleware: Vec<Box<dyn Middleware>>,
    endpoint: Box<dyn Endpoint>,
}

impl Pipeline {
    pub fn builder() -> Builder {
        Builder { middleware: Vec::new() }
    }

    /// Runs the whole chain against `ctx`.
    ///
    /// An `Err` is whatever error escaped the outermost middleware.
    pub async fn handle(&self, ctx: &mut Context) -> Result<(), Error> {
        Next::new(&self.middleware, self.endpoint.as_ref()).run(ctx).await
    }

    /// Runs the chain and produces the response to send.
    ///
    /// An unrecovered error is logged and answered with a generic error
    /// response; whatever the chain had written to `ctx` is discarded.
    pub async fn respond(&self, ctx: &mut Context) -> Response {
        match self.handle(ctx).await {
            Ok(()) => ctx.take_response(),
            Err(e) => {
                error!(method = %ctx.method(), path = %ctx.path(), error = %e, "request failed");
                Response::from_error(&e)
            }
        }
    }

    /// Number of middleware stages, not counting the endpoint.
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

/// Collects middleware for a [`Pipeline`].
///
/// Order matters: the first stage registered is the outermost one.
pub struct Builder {
    middleware: Vec<Box<dyn Middleware>>,
}

impl Builder {
    /// Appends a stage inside every stage registered so far.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Closes the pipeline with its endpoint.
    pub fn endpoint(self, endpoint: impl Endpoint) -> Pipeline {
        Pipeline { middleware: self.middleware, endpoint: Box::new(endpoint) }
    }
}
