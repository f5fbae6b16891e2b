//! HTTP access for raw configuration files and repository existence probes.

mod error;
mod reqwest_client;

pub use error::HttpError;
pub use reqwest_client::ReqwestHttpClient;

use async_trait::async_trait;

/// Response of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs a GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;

    /// Performs a HEAD request and returns the status code.
    async fn head(&self, url: &str) -> Result<u16, HttpError>;
}

/// Returns true when a HEAD request to `url` answers with a 2xx status.
///
/// Transport errors count as "does not exist".
pub async fn probe_exists(http: &dyn HttpClient, url: &str) -> bool {
    match http.head(url).await {
        Ok(status) => (200..300).contains(&status),
        Err(e) => {
            tracing::debug!(url, error = %e, "Existence probe failed");
            false
        }
    }
}
