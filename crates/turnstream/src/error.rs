//! Error taxonomy for turn execution.
//!
//! Turn-level failures ([`ChatError`]) abort the current turn and escalate to
//! the caller. Per-call tool failures live in [`crate::tool::ToolError`] and
//! never escalate; structured-output parse failures live in
//! [`crate::structured::ParseError`]. Cancellation is not an error anywhere
//! in this crate.

use thiserror::Error;

/// A failure that aborts the current turn.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// HTTP transport failure or non-success status.
    #[error("http error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Http {
        /// Status code, when a response was received at all.
        status: Option<http::StatusCode>,
        /// Human-readable description.
        message: String,
        /// Whether retrying the turn might succeed.
        retryable: bool,
    },

    /// The backend reported an error, either as an in-band `error` field in
    /// the stream or as a structured error body.
    #[error("backend error: {message}")]
    Backend {
        /// The backend's own message.
        message: String,
    },

    /// A stream line was not valid JSON. Carries the offending raw text; the
    /// decoder does not attempt recovery.
    #[error("malformed stream line: {message}")]
    Decode {
        /// Parser diagnostic.
        message: String,
        /// The raw line that failed to parse.
        line: String,
    },

    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ChatError {
    /// Whether the orchestration loop may reasonably retry the turn.
    ///
    /// Decode and in-band backend errors are not retryable; transport errors
    /// carry their own retryability (connect failures and 5xx are, 4xx is
    /// not).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { retryable, .. } => *retryable,
            Self::Backend { .. } | Self::Decode { .. } | Self::InvalidRequest(_) => false,
        }
    }
}
