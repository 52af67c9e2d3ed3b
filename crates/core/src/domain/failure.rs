// Publish failure taxonomy
//
// Every failure is terminal for the current attempt. The scheduler records
// the Display text on the post, so each variant keeps a distinct prefix.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishFailure {
    /// Required credential or media reference missing before any network call
    #[error("validation failed: {0}")]
    Validation(String),

    /// Network error, request timeout, or an unparseable response body
    #[error("transport failure: {0}")]
    Transport(String),

    /// The platform reported an error, or a success response lacked its id
    #[error("platform rejected the request: {0}")]
    Protocol(String),

    /// Readiness polling ran out of time without a terminal container status
    #[error(
        "timed out after {waited_secs}s waiting for container {creation_id} to become ready (last status: {})",
        last_status.as_deref().unwrap_or("none")
    )]
    Timeout {
        creation_id: String,
        waited_secs: u64,
        last_status: Option<String>,
    },

    /// Anything else surfacing from the per-post processing path
    #[error("unexpected failure: {0}")]
    Unclassified(String),
}

impl PublishFailure {
    /// Stable label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            PublishFailure::Validation(_) => "validation",
            PublishFailure::Transport(_) => "transport",
            PublishFailure::Protocol(_) => "protocol",
            PublishFailure::Timeout { .. } => "timeout",
            PublishFailure::Unclassified(_) => "unclassified",
        }
    }
}
