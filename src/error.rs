//! Long poll error types.

use thiserror::Error;

/// Errors produced by the long poll client and dispatch loop.
#[derive(Error, Debug)]
pub enum LongPollError {
    /// Network-level failure reaching the long poll server.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("long poll server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// The response body (or an update payload) did not match the
    /// expected shape.
    #[error("malformed long poll response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The session's server URL could not be parsed.
    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl LongPollError {
    /// Check if this error is worth retrying by an outer policy.
    ///
    /// The loop itself never retries; this classification lets the
    /// embedding application decide whether to restart the poll.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Result type for long poll operations.
pub type LongPollResult<T> = Result<T, LongPollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = LongPollError::Server {
            status: 503,
            body: "unavailable".into(),
        };
        assert!(err.is_retryable());

        let err = LongPollError::Server {
            status: 429,
            body: "slow down".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn client_side_errors_are_not_retryable() {
        let err = LongPollError::Server {
            status: 403,
            body: "forbidden".into(),
        };
        assert!(!err.is_retryable());

        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!LongPollError::Decode(bad_json).is_retryable());

        let bad_url = url::Url::parse("not a url").unwrap_err();
        assert!(!LongPollError::InvalidUrl(bad_url).is_retryable());
    }
}
