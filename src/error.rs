//! Unified error type.

use std::time::Duration;

use http::StatusCode;

/// A boxed, thread-safe error from application code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by onion's fallible operations.
///
/// Deliberate application outcomes (404, 405, a middleware answering early)
/// are [`Response`](crate::Response) values, not `Error`s. An `Error` is
/// something that went wrong: a handler failed, a deadline passed, or the
/// server could not bind or accept.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    Addr(String),

    #[error("handler: {0}")]
    Handler(#[source] BoxError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Wraps any application error.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// A handler failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Handler(message.into().into())
    }

    /// The status sent to the client when this error is not recovered.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecovered_errors_map_to_server_error_statuses() {
        assert_eq!(Error::msg("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            Error::Timeout(Duration::from_millis(5)).status(),
            StatusCode::SERVICE_UNAVAILABLE,
        );
    }

    #[test]
    fn handler_error_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = Error::handler(io);
        assert_eq!(err.to_string(), "handler: disk on fire");
        assert!(std::error::Error::source(&err).is_some());
    }
}
