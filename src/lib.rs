//! # onion
//!
//! Nested, awaitable middleware pipelines for HTTP services on hyper.
//!
//! ## The model
//!
//! A [`Pipeline`] is an ordered list of [`Middleware`](middleware::Middleware)
//! wrapped around one [`Endpoint`]. Each middleware gets the request
//! [`Context`] and a [`Next`](middleware::Next); code before
//! `next.run(ctx).await` runs on the way in, code after it runs on the way
//! out, once everything further in has finished. A middleware that never runs
//! `next` answers the request itself.
//!
//! `next.run` must be awaited: it borrows the context mutably and does nothing
//! until polled, so there is no way to fire it and carry on.
//!
//! What onion leaves to others:
//!
//! - **HTTP parsing and connections** — hyper
//! - **Route matching** — [`matchit`], wrapped by [`Router`]
//! - **TLS, rate limiting, body-size limits** — your reverse proxy
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use onion::middleware::{Marker, Timeout, Timing};
//! use onion::{Html, Pipeline, Request, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let routes = Router::new().get("/home", home);
//!
//!     let app = Pipeline::builder()
//!         .wrap(Timing::new())
//!         .wrap(Marker::new("auth start", "auth end"))
//!         .wrap(Timeout::new(Duration::from_secs(10)))
//!         .endpoint(routes);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn home(_req: Request) -> Html<&'static str> {
//!     Html("<h1>HOME page</h1>")
//! }
//! ```

mod context;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;
pub mod pipeline;

pub use http;

pub use context::Context;
pub use error::{BoxError, Error};
pub use handler::{BoxFuture, Handler, HandlerOutput};
pub use pipeline::{Endpoint, Pipeline, endpoint_fn};
pub use request::Request;
pub use response::{ContentType, Html, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, serve_listener};
