//! Source API error types.

use thiserror::Error;

/// Errors that can occur while reading from the source workspace.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Credentials were rejected. Fatal: the run aborts before any writes.
    #[error("Bitbucket authentication failed: {0}")]
    Authentication(String),

    /// The API answered with a non-2xx status that retries could not clear.
    #[error("Bitbucket API unavailable (HTTP {status}): {url}")]
    Unavailable { status: u16, url: String },

    /// Transport-level failure (connection, timeout) that outlasted the
    /// retry budget.
    #[error("Bitbucket request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape. The orchestrator
    /// downgrades this to a per-item mapping failure.
    #[error("Unexpected response shape from {url}: {message}")]
    UnexpectedShape { url: String, message: String },
}
