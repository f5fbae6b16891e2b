//! HTTP error types.

use thiserror::Error;

/// Errors raised by HTTP clients.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request could not be completed.
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
}
