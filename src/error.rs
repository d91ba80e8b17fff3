//! Error types for gh-automerge

use thiserror::Error;

/// Errors produced by the merge loop and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// Queue item is not a pull request URL of the form `/{owner}/{repo}/pull/{number}`
    #[error("invalid pull request URL '{url}': {reason}")]
    InvalidPrUrl {
        /// The rejected input
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// GitHub API call failed (network, auth, not found, ...)
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// No usable credential
    #[error("authentication error: {0}")]
    Auth(String),

    /// Invalid startup configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// The merge endpoint failed without the error envelope we classify on
    #[error("unexpected merge response (HTTP {status}): {body}")]
    UnexpectedMergeResponse {
        /// HTTP status code returned by the merge endpoint
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Pulling or pushing the local mirror failed
    #[error("branch update failed: {0}")]
    BranchUpdate(String),

    /// Local git repository could not be used
    #[error("git error: {0}")]
    Git(String),

    /// The retry queue has no receiver left
    #[error("retry queue closed")]
    QueueClosed,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error indicates a broken assumption about the remote API
    /// rather than a per-item failure. Defects stop the merge loop.
    pub const fn is_defect(&self) -> bool {
        matches!(self, Self::UnexpectedMergeResponse { .. })
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
