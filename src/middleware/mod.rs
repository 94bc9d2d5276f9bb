//! Middleware: stages that run before *and* after the rest of the pipeline.
//!
//! A middleware receives the request [`Context`] and a [`Next`]. Everything it
//! does before `next.run(ctx).await` happens on the way in; everything after
//! happens on the way out, once every later stage and the endpoint are done:
//!
//! ```text
//! Timing ─┐                                              ┌─ Timing logs
//!         Marker 1 ─┐                          ┌─ Marker 1 end
//!                   Marker 2 ─┐      ┌─ Marker 2 end
//!                             endpoint
//! ```
//!
//! `Next::run` takes `self` and borrows the context mutably, so the rest of
//! the chain runs at most once and only while the caller is awaiting it.
//! Dropping `next` without running it ends the request right there.
//!
//! Built-in middleware:
//! - [`Timing`] — one `<path> start: … end: … loading: …` line per request
//! - [`Marker`] — fixed enter/exit log lines
//! - [`Timeout`] — cancels the downstream chain after a deadline
//! - [`Recover`] — turns downstream errors into an error response

mod marker;
mod recover;
mod timeout;
mod timing;

pub use marker::Marker;
pub use recover::Recover;
pub use timeout::Timeout;
pub use timing::{Timing, TimingRecord};

use crate::context::Context;
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::pipeline::Endpoint;

/// A pipeline stage with access to the rest of the chain.
///
/// Implement it on a struct for configurable middleware, or wrap a closure
/// with [`from_fn`].
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>>;
}

/// The rest of the pipeline, from the stage after the current one down to the
/// endpoint.
pub struct Next<'a> {
    chain: &'a [Box<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Box<dyn Middleware>], endpoint: &'a dyn Endpoint) -> Self {
        Self { chain, endpoint }
    }

    /// Runs every downstream stage and resolves once they have all finished.
    pub async fn run(self, ctx: &mut Context) -> Result<(), Error> {
        match self.chain.split_first() {
            Some((head, rest)) => head.call(ctx, Next::new(rest, self.endpoint)).await,
            None => self.endpoint.call(ctx).await,
        }
    }

    /// Stages left before the endpoint.
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }
}

/// Middleware built from a closure.
///
/// ```rust
/// use onion::middleware::from_fn;
///
/// let stamp = from_fn(|ctx, next| Box::pin(async move {
///     ctx.set_state("seen-by", "stamp");
///     next.run(ctx).await
/// }));
/// ```
pub fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<(), Error>>
        + Send
        + Sync
        + 'static,
{
    FnMiddleware(f)
}

/// See [`from_fn`].
pub struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<(), Error>>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        (self.0)(ctx, next)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::{Method, StatusCode};

    use super::*;
    use crate::pipeline::{Pipeline, endpoint_fn};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Logs `enter <name>`, runs the rest, logs `exit <name>`.
    struct Step {
        name: &'static str,
        log: Log,
        proceed: bool,
    }

    impl Middleware for Step {
        fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("enter {}", self.name));
                if self.proceed {
                    next.run(ctx).await?;
                }
                self.log.lock().unwrap().push(format!("exit {}", self.name));
                Ok(())
            })
        }
    }

    fn step(name: &'static str, log: &Log) -> Step {
        Step { name, log: Arc::clone(log), proceed: true }
    }

    fn recording_endpoint(log: &Log) -> impl Endpoint + use<> {
        let log = Arc::clone(log);
        endpoint_fn(move |ctx| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push("endpoint".to_owned());
                ctx.text("done");
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn entries_nest_around_the_endpoint() {
        let log = Log::default();
        let pipeline = Pipeline::builder()
            .wrap(step("a", &log))
            .wrap(step("b", &log))
            .wrap(step("c", &log))
            .endpoint(recording_endpoint(&log));

        let mut ctx = Context::new(Method::GET, "/");
        pipeline.handle(&mut ctx).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["enter a", "enter b", "enter c", "endpoint", "exit c", "exit b", "exit a"],
        );
        assert_eq!(ctx.body(), b"done");
    }

    #[tokio::test]
    async fn skipping_next_short_circuits_the_rest() {
        let log = Log::default();
        let pipeline = Pipeline::builder()
            .wrap(step("a", &log))
            .wrap(Step { name: "gate", log: Arc::clone(&log), proceed: false })
            .wrap(step("c", &log))
            .endpoint(recording_endpoint(&log));

        let mut ctx = Context::new(Method::GET, "/");
        pipeline.handle(&mut ctx).await.unwrap();

        assert_eq!(*log.lock().unwrap(), ["enter a", "enter gate", "exit gate", "exit a"]);
        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
        assert!(ctx.body().is_empty());
    }

    #[tokio::test]
    async fn endpoint_errors_unwind_through_every_entry() {
        let log = Log::default();
        let pipeline = Pipeline::builder()
            .wrap(step("a", &log))
            .wrap(step("b", &log))
            .endpoint(endpoint_fn(|_ctx| Box::pin(async { Err::<(), _>(Error::msg("boom")) })));

        let mut ctx = Context::new(Method::GET, "/");
        let err = pipeline.handle(&mut ctx).await.unwrap_err();

        assert_eq!(err.to_string(), "handler: boom");
        // `?` in Step skips the exit lines.
        assert_eq!(*log.lock().unwrap(), ["enter a", "enter b"]);
    }

    #[tokio::test]
    async fn an_entry_can_recover_locally() {
        let pipeline = Pipeline::builder()
            .wrap(from_fn(|ctx, next| Box::pin(async move {
                if next.run(ctx).await.is_err() {
                    ctx.set_status(StatusCode::BAD_GATEWAY);
                    ctx.text("upstream gone");
                }
                Ok(())
            })))
            .endpoint(endpoint_fn(|_ctx| Box::pin(async { Err::<(), _>(Error::msg("down")) })));

        let mut ctx = Context::new(Method::GET, "/");
        pipeline.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ctx.body(), b"upstream gone");
    }

    #[tokio::test]
    async fn closure_middleware_sees_downstream_writes() {
        let pipeline = Pipeline::builder()
            .wrap(from_fn(|ctx, next| Box::pin(async move {
                ctx.set_state("trace", "outer");
                next.run(ctx).await?;
                let body = format!("{}!", String::from_utf8_lossy(ctx.body()));
                ctx.text(body);
                Ok(())
            })))
            .endpoint(endpoint_fn(|ctx| Box::pin(async move {
                let seen = ctx.state("trace").unwrap_or("none").to_owned();
                ctx.text(seen);
                Ok(())
            })));

        let mut ctx = Context::new(Method::GET, "/");
        pipeline.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.body(), b"outer!");
    }

    #[tokio::test]
    async fn remaining_counts_down_to_the_endpoint() {
        let seen = Log::default();
        let tally = |seen: &Log| {
            let seen = Arc::clone(seen);
            from_fn(move |ctx, next| {
                seen.lock().unwrap().push(next.remaining().to_string());
                Box::pin(async move { next.run(ctx).await })
            })
        };
        let pipeline = Pipeline::builder()
            .wrap(tally(&seen))
            .wrap(tally(&seen))
            .endpoint(endpoint_fn(|_ctx| Box::pin(async { Ok(()) })));

        pipeline.handle(&mut Context::new(Method::GET, "/")).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), ["1", "0"]);
    }
}
