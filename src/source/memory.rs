//! In-memory backend.
//!
//! Serves whatever responses were last stored in it. Useful for embedding the
//! dashboard in tests or demos without a running Vision server.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::api::{Bookmark, DashboardData, QueryRequest, QueryResponse, RemoteConfig};
use super::{Backend, FetchError};
use crate::data::{HealthMap, InventoryTree};

#[derive(Debug, Default)]
struct Responses {
    config: Option<RemoteConfig>,
    inventory: InventoryTree,
    health: HealthMap,
    bookmarks: Vec<Bookmark>,
    /// When set, every request fails with this status.
    failing_status: Option<u16>,
    queries: Vec<QueryRequest>,
}

/// A backend whose responses are set by the caller.
///
/// Clones share the same responses, so a test can keep one handle and give
/// another to the dashboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    responses: Arc<Mutex<Responses>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Responses> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Serve `config` from `/api/config`. Without one, the config request fails with 404.
    pub fn set_config(&self, config: RemoteConfig) {
        self.lock().config = Some(config);
    }

    pub fn set_inventory(&self, inventory: InventoryTree) {
        self.lock().inventory = inventory;
    }

    pub fn set_health(&self, health: HealthMap) {
        self.lock().health = health;
    }

    pub fn set_bookmarks(&self, bookmarks: Vec<Bookmark>) {
        self.lock().bookmarks = bookmarks;
    }

    /// Make every request fail with `status` (or succeed again with `None`).
    pub fn set_failing(&self, status: Option<u16>) {
        self.lock().failing_status = status;
    }

    /// Query requests received so far.
    pub fn received_queries(&self) -> Vec<QueryRequest> {
        self.lock().queries.clone()
    }

    fn check(&self, endpoint: &str) -> Result<MutexGuard<'_, Responses>, FetchError> {
        let guard = self.lock();
        let failing_status = guard.failing_status;
        match failing_status {
            Some(status) => Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status,
            }),
            None => Ok(guard),
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn config(&self) -> Result<RemoteConfig, FetchError> {
        let guard = self.check(super::endpoints::CONFIG)?;
        guard.config.clone().ok_or_else(|| FetchError::Status {
            endpoint: super::endpoints::CONFIG.to_string(),
            status: 404,
        })
    }

    async fn inventory(&self) -> Result<InventoryTree, FetchError> {
        Ok(self.check(super::endpoints::ENVIRONMENTS)?.inventory.clone())
    }

    async fn health(&self) -> Result<HealthMap, FetchError> {
        Ok(self.check(super::endpoints::HEALTH)?.health.clone())
    }

    async fn check_health(&self) -> Result<HealthMap, FetchError> {
        Ok(self.check(super::endpoints::HEALTH_CHECK)?.health.clone())
    }

    async fn dashboard(&self) -> Result<DashboardData, FetchError> {
        let guard = self.check(super::endpoints::DASHBOARD)?;
        Ok(DashboardData {
            environments: guard.inventory.clone(),
            health: guard.health.clone(),
        })
    }

    async fn bookmarks(&self) -> Result<Vec<Bookmark>, FetchError> {
        Ok(self.check(super::endpoints::BOOKMARKS)?.bookmarks.clone())
    }

    async fn search_bookmarks(&self, query: &str) -> Result<Vec<Bookmark>, FetchError> {
        let guard = self.check(super::endpoints::BOOKMARKS_SEARCH)?;
        let needle = query.to_lowercase();
        Ok(guard
            .bookmarks
            .iter()
            .filter(|b| b.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn execute_query(&self, request: &QueryRequest) -> Result<QueryResponse, FetchError> {
        let mut guard = self.check(super::endpoints::DB_EXECUTE)?;
        guard.queries.push(request.clone());
        Ok(QueryResponse {
            success: true,
            columns: Some(Vec::new()),
            rows: Some(Vec::new()),
            error: None,
            executed_query: Some(request.query.clone()),
        })
    }

    fn description(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Database;

    #[tokio::test]
    async fn test_memory_backend_serves_latest() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();

        let mut health = HealthMap::new();
        health.insert("env_x".into(), true);
        handle.set_health(health.clone());

        assert_eq!(backend.health().await.unwrap(), health);
        assert_eq!(backend.dashboard().await.unwrap().health, health);
    }

    #[tokio::test]
    async fn test_memory_backend_failing() {
        let backend = MemoryBackend::new();
        backend.set_failing(Some(503));

        let err = backend.health().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));

        backend.set_failing(None);
        assert!(backend.health().await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_backend_config_missing() {
        let backend = MemoryBackend::new();
        assert!(backend.config().await.is_err());
    }

    #[tokio::test]
    async fn test_memory_backend_records_queries() {
        let backend = MemoryBackend::new();
        let request = QueryRequest {
            db_config: Database::new("h", 5432, "d"),
            query: "SELECT 1".into(),
        };

        let response = backend.execute_query(&request).await.unwrap();
        assert!(response.success);
        assert_eq!(backend.received_queries(), vec![request]);
    }
}
