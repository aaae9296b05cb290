//! Error types exposed by the GitHub interaction layer.

use thiserror::Error;

/// Errors surfaced while configuring the service or querying GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The configured API base URL could not be parsed.
    #[error("API base URL is invalid: {0}")]
    InvalidUrl(String),

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The GraphQL endpoint answered with an `errors` array.
    #[error("GitHub GraphQL error: {}", messages.join("; "))]
    GraphQl {
        /// Messages from each entry of the `errors` array.
        messages: Vec<String>,
    },

    /// The GraphQL response carried neither data nor errors.
    #[error("malformed GraphQL response: {message}")]
    MalformedResponse {
        /// What was missing from the response.
        message: String,
    },

    /// The walker stopped because a user kept reporting further pages.
    #[error("stopped after {limit} pages without exhausting every collection")]
    PageLimitExceeded {
        /// The configured page ceiling.
        limit: u32,
    },

    /// The task walking a user's collections did not complete.
    #[error("task failed: {message}")]
    Task {
        /// Join error detail.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}
