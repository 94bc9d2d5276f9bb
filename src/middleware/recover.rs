//! Local recovery from downstream errors.

use tracing::error;

use super::{Middleware, Next};
use crate::context::Context;
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::response::Response;

/// Converts any downstream error into a generic error response.
///
/// Stages registered before `Recover` see a successful `next.run(..)` and
/// keep running their exit code; the client gets the same reply it would get
/// from an unrecovered error.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recover;

impl Recover {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for Recover {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            if let Err(e) = next.run(ctx).await {
                error!(path = %ctx.path(), error = %e, "recovered from handler error");
                ctx.set_response(Response::from_error(&e));
            }
            Ok(())
        })
    }
}
