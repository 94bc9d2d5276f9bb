//! Route handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in one
//! `HashMap<Method, Tree>`, so each one is hidden behind a trait object:
//!
//! ```text
//! async fn home(req: Request) -> Html<&'static str> { … }   ← user writes this
//!        ↓ router.get("/home", home)
//! home.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(home))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time             ← one vtable dispatch
//!        ↓
//! Box::pin(async { home(req).await.into_output() })  ← BoxFuture
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future.
///
/// Middleware and endpoints return `BoxFuture<'a, Result<(), Error>>` where
/// `'a` is the borrow of the [`Context`](crate::Context); route handlers
/// return `'static` ones because they own their [`Request`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ── HandlerOutput ─────────────────────────────────────────────────────────────

/// What a route handler may return: any [`IntoResponse`] value, or a
/// `Result` whose error becomes a pipeline failure.
pub trait HandlerOutput {
    fn into_output(self) -> Result<Response, Error>;
}

impl<T: IntoResponse> HandlerOutput for T {
    fn into_output(self) -> Result<Response, Error> {
        Ok(self.into_response())
    }
}

impl<T, E> HandlerOutput for Result<T, E>
where
    T: IntoResponse,
    E: Into<Error>,
{
    fn into_output(self) -> Result<Response, Error> {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, Error>>;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler:
///
/// ```text
/// async fn name(req: Request) -> impl HandlerOutput
/// ```
///
/// Sealed: only the blanket impl below satisfies it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerOutput + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerOutput + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerOutput + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, Error>> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_output() })
    }
}
