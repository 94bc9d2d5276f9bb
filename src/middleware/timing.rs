//! Request timing.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::info;

use super::{Middleware, Next};
use crate::context::Context;
use crate::error::Error;
use crate::handler::BoxFuture;

/// Wall-clock timing of one trip through the downstream chain.
///
/// Displays as `<path> start: <ms> end: <ms> loading: <ms>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimingRecord {
    pub path: String,
    /// Milliseconds since the Unix epoch.
    pub start: u64,
    /// Milliseconds since the Unix epoch, never before `start`.
    pub end: u64,
}

impl TimingRecord {
    pub fn loading(&self) -> u64 {
        self.end - self.start
    }
}

impl fmt::Display for TimingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} start: {} end: {} loading: {}",
            self.path, self.start, self.end, self.loading(),
        )
    }
}

/// Logs how long everything after it took.
///
/// Register it first so it wraps the whole pipeline. The record is logged
/// whether or not the downstream chain failed, and is left in the context's
/// extensions for anything further out to read.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timing;

impl Timing {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for Timing {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let start = epoch_millis();
            let result = next.run(ctx).await;
            // The wall clock may step backwards mid-request.
            let end = epoch_millis().max(start);

            let record = TimingRecord { path: ctx.path().to_owned(), start, end };
            info!(
                path = %record.path,
                start = record.start,
                end = record.end,
                loading = record.loading(),
                "{record}",
            );
            ctx.extensions_mut().insert(record);
            result
        })
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(saturating_millis)
        .unwrap_or(0)
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
