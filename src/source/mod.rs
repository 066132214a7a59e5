//! Backend abstraction for fetching inventory and health.
//!
//! This module provides a trait-based abstraction over the Vision backend's
//! HTTP API, with a `reqwest` implementation and an in-memory one.

mod api;
mod error;
mod http;
mod memory;

pub use api::{
    endpoints, Bookmark, BookmarksResponse, DashboardData, HealthCheckResponse, QueryRequest,
    QueryResponse, RemoteConfig,
};
pub use error::FetchError;
pub use http::{HttpBackend, HttpBackendBuilder, DEFAULT_BASE_URL};
pub use memory::MemoryBackend;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::{HealthMap, InventoryTree};

/// The request/response contract of the Vision backend.
///
/// Every method is one request; none of them retry. Callers decide what a
/// failure means (fallback, keep stale data, surface an error).
///
/// # Example
///
/// ```
/// use vision_dashboard::{Backend, MemoryBackend};
///
/// # tokio_test::block_on(async {
/// let backend = MemoryBackend::new();
/// let health = backend.health().await.unwrap();
/// assert!(health.is_empty());
/// # });
/// ```
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// `GET /api/config`
    async fn config(&self) -> Result<RemoteConfig, FetchError>;

    /// `GET /api/environments`
    async fn inventory(&self) -> Result<InventoryTree, FetchError>;

    /// `GET /api/health`: the backend's cached health map.
    async fn health(&self) -> Result<HealthMap, FetchError>;

    /// `GET /api/health/check`: forces a fresh check server-side.
    async fn check_health(&self) -> Result<HealthMap, FetchError>;

    /// `GET /api/dashboard_data`: inventory and health in one response.
    async fn dashboard(&self) -> Result<DashboardData, FetchError>;

    /// `GET /api/bookmarks`
    async fn bookmarks(&self) -> Result<Vec<Bookmark>, FetchError>;

    /// `GET /api/bookmarks/search?q=...`; ranking is done by the backend.
    async fn search_bookmarks(&self, query: &str) -> Result<Vec<Bookmark>, FetchError>;

    /// `POST /api/db/execute`
    async fn execute_query(&self, request: &QueryRequest) -> Result<QueryResponse, FetchError>;

    /// Returns a human-readable description of the backend.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
