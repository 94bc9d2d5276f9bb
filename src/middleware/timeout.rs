//! Per-request deadlines.

use std::time::Duration;

use tracing::warn;

use super::{Middleware, Next};
use crate::context::Context;
use crate::error::Error;
use crate::handler::BoxFuture;

/// Gives the downstream chain a deadline.
///
/// When it passes, the downstream future is dropped mid-flight (its pending
/// work never resumes) and this stage returns [`Error::Timeout`]. Stages
/// outside it see the error from their own `next.run(..)` call.
#[derive(Clone, Copy, Debug)]
pub struct Timeout {
    limit: Duration,
}

impl Timeout {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

impl Middleware for Timeout {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let outcome = tokio::time::timeout(self.limit, next.run(ctx)).await;
            match outcome {
                Ok(result) => result,
                Err(_) => {
                    warn!(path = %ctx.path(), limit = ?self.limit, "request timed out");
                    Err(Error::Timeout(self.limit))
                }
            }
        })
    }
}
