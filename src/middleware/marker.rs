//! Enter/exit log markers.

use std::borrow::Cow;

use tracing::info;

use super::{Middleware, Next};
use crate::context::Context;
use crate::error::Error;
use crate::handler::BoxFuture;

/// Logs one line on the way in and another on the way out.
///
/// With several markers registered in a row the exit lines come out in
/// reverse order, after the endpoint has run.
#[derive(Clone, Debug)]
pub struct Marker {
    enter: Cow<'static, str>,
    exit: Cow<'static, str>,
}

impl Marker {
    pub fn new(enter: impl Into<Cow<'static, str>>, exit: impl Into<Cow<'static, str>>) -> Self {
        Self { enter: enter.into(), exit: exit.into() }
    }
}

impl Middleware for Marker {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            info!("{}", self.enter);
            next.run(ctx).await?;
            info!("{}", self.exit);
            Ok(())
        })
    }
}
