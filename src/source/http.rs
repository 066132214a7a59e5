//! HTTP backend client.
//!
//! Talks to the Vision backend's JSON API with `reqwest`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vision_dashboard::{Backend, HttpBackend};
//!
//! # tokio_test::block_on(async {
//! let backend = HttpBackend::builder()
//!     .base_url("http://localhost:5000")
//!     .build()
//!     .unwrap();
//!
//! let health = backend.health().await.unwrap();
//! println!("{} health keys", health.len());
//! # });
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use super::api::{
    endpoints, Bookmark, BookmarksResponse, DashboardData, HealthCheckResponse, QueryRequest,
    QueryResponse, RemoteConfig,
};
use super::{Backend, FetchError};
use crate::data::{HealthMap, InventoryTree};

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    description: String,
}

impl HttpBackend {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::default()
    }

    /// The base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url.join(path).map_err(|e| FetchError::Url(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let response = self.client.get(self.url(path)?).send().await?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, FetchError> {
        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn config(&self) -> Result<RemoteConfig, FetchError> {
        self.get_json(endpoints::CONFIG).await
    }

    async fn inventory(&self) -> Result<InventoryTree, FetchError> {
        self.get_json(endpoints::ENVIRONMENTS).await
    }

    async fn health(&self) -> Result<HealthMap, FetchError> {
        self.get_json(endpoints::HEALTH).await
    }

    async fn check_health(&self) -> Result<HealthMap, FetchError> {
        let response: HealthCheckResponse = self.get_json(endpoints::HEALTH_CHECK).await?;
        Ok(response.health)
    }

    async fn dashboard(&self) -> Result<DashboardData, FetchError> {
        self.get_json(endpoints::DASHBOARD).await
    }

    async fn bookmarks(&self) -> Result<Vec<Bookmark>, FetchError> {
        let response: BookmarksResponse = self.get_json(endpoints::BOOKMARKS).await?;
        Ok(response.bookmarks)
    }

    async fn search_bookmarks(&self, query: &str) -> Result<Vec<Bookmark>, FetchError> {
        let response = self
            .client
            .get(self.url(endpoints::BOOKMARKS_SEARCH)?)
            .query(&[("q", query)])
            .send()
            .await?;
        let response: BookmarksResponse =
            Self::decode(endpoints::BOOKMARKS_SEARCH, response).await?;
        Ok(response.bookmarks)
    }

    async fn execute_query(&self, request: &QueryRequest) -> Result<QueryResponse, FetchError> {
        let response = self
            .client
            .post(self.url(endpoints::DB_EXECUTE)?)
            .json(request)
            .send()
            .await?;

        // A failed query is reported in the body, often with a 4xx/5xx status.
        let status = response.status();
        let body = response.bytes().await?;
        match serde_json::from_slice::<QueryResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(FetchError::Status {
                endpoint: endpoints::DB_EXECUTE.to_string(),
                status: status.as_u16(),
            }),
            Err(e) => Err(FetchError::Decode(e.to_string())),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpBackend`].
#[derive(Debug, Default)]
pub struct HttpBackendBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpBackendBuilder {
    /// Set the backend address (default: "http://localhost:5000").
    ///
    /// Any path or query string is dropped; endpoints are absolute paths.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpBackend, FetchError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let raw = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut base_url = Url::parse(&raw).map_err(|e| FetchError::Url(format!("{raw}: {e}")))?;
        base_url.set_query(None);
        base_url.set_fragment(None);

        let client = Client::builder().timeout(timeout).build()?;

        Ok(HttpBackend {
            client,
            description: format!("http: {}", base_url.as_str().trim_end_matches('/')),
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let backend = HttpBackend::builder().build().unwrap();
        assert_eq!(backend.base_url().as_str(), "http://localhost:5000/");
        assert_eq!(backend.description(), "http: http://localhost:5000");
    }

    #[test]
    fn test_builder_strips_query() {
        let backend = HttpBackend::builder()
            .base_url("http://vision.local:8080/?mode=monitor")
            .build()
            .unwrap();
        assert_eq!(backend.base_url().as_str(), "http://vision.local:8080/");
    }

    #[test]
    fn test_endpoint_urls() {
        let backend = HttpBackend::builder().base_url("http://vision.local/dashboard").build().unwrap();
        assert_eq!(
            backend.url(endpoints::HEALTH_CHECK).unwrap().as_str(),
            "http://vision.local/api/health/check"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpBackend::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, FetchError::Url(_)));
    }
}
