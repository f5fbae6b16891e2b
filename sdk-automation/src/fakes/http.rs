//! Static HTTP client.

use crate::http::{HttpClient, HttpError, HttpResponse};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// HTTP client answering from fixed tables.
///
/// `HEAD` returns 200 for URLs registered with [`with_existing`](Self::with_existing)
/// or [`with_body`](Self::with_body) and 404 otherwise.
#[derive(Default)]
pub struct StaticHttpClient {
    existing: HashSet<String>,
    bodies: HashMap<String, String>,
    requests: RwLock<Vec<String>>,
}

impl StaticHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_existing(mut self, url: &str) -> Self {
        self.existing.insert(url.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, url: &str, body: impl Into<String>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    /// Requests made so far, as `GET url` or `HEAD url`.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl HttpClient for StaticHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requests.write().await.push(format!("GET {url}"));
        Ok(match self.bodies.get(url) {
            Some(body) => HttpResponse {
                status: 200,
                body: body.clone(),
            },
            None => HttpResponse {
                status: 404,
                body: String::new(),
            },
        })
    }

    async fn head(&self, url: &str) -> Result<u16, HttpError> {
        self.requests.write().await.push(format!("HEAD {url}"));
        if self.existing.contains(url) || self.bodies.contains_key(url) {
            Ok(200)
        } else {
            Ok(404)
        }
    }
}
