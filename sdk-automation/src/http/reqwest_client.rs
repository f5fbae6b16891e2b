//! `reqwest`-backed HTTP client.

use super::{HttpClient, HttpError, HttpResponse};
use async_trait::async_trait;
use std::time::Duration;

/// HTTP client built on `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Creates a client with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sdk-automation/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Request {
                url: String::new(),
                source: e,
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let to_error = |e| HttpError::Request {
            url: url.to_string(),
            source: e,
        };
        let response = self.client.get(url).send().await.map_err(to_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(to_error)?;
        Ok(HttpResponse { status, body })
    }

    async fn head(&self, url: &str) -> Result<u16, HttpError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| HttpError::Request {
                url: url.to_string(),
                source: e,
            })?;
        Ok(response.status().as_u16())
    }
}
