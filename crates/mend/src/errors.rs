use thiserror::Error;

/// Failures from a remote completion call.
///
/// `Timeout` and `Network` are transient and eligible for retry; the
/// remaining variants are terminal and reported immediately.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Whether the failure happened below the application layer and a
    /// fresh attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CompletionError::Timeout | CompletionError::Network(_))
    }
}

pub type CompletionResult<T> = Result<T, CompletionError>;
